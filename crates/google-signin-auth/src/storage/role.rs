//! Role type and resolver trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;

/// A role granted to accounts.
///
/// Identifiers take the form `Package.Key:RoleName`; identifiers without a
/// package part are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    /// Full role identifier.
    pub identifier: String,

    /// Package part of the identifier, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_key: Option<String>,

    /// Role name without package.
    pub name: String,
}

impl Role {
    /// Creates a role from its identifier.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let (package_key, name) = match identifier.rsplit_once(':') {
            Some((package, name)) if !package.is_empty() => {
                (Some(package.to_string()), name.to_string())
            }
            _ => (None, identifier.clone()),
        };
        Self {
            identifier,
            package_key,
            name,
        }
    }
}

/// Resolves configured role identifiers to roles.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    /// Resolves a role identifier.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnknownRole` if no such role exists.
    async fn resolve(&self, role_id: &str) -> AuthResult<Role>;
}
