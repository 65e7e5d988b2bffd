//! Account type and repository trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::profile::Profile;
use super::role::Role;
use crate::AuthResult;
use crate::token::AuthenticationStatus;

// =============================================================================
// Account Type
// =============================================================================

/// A local account linked to an identity at the remote provider.
///
/// The pair `(identifier, provider_name)` is unique across the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Storage identifier.
    pub id: Uuid,

    /// Provider-scoped identifier; equals the `sub` claim.
    pub identifier: String,

    /// Name of the authentication provider that owns this account.
    pub provider_name: String,

    /// Roles granted to the account.
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Long-lived access token obtained on the last successful login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_source: Option<String>,

    /// Profile attached on first login, if provisioning is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,

    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the account last authenticated successfully.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_successful_authentication_at: Option<OffsetDateTime>,

    /// Failed attempts since the last successful one.
    #[serde(default)]
    pub failed_authentication_count: u32,
}

impl Account {
    /// Creates a new account without roles, credentials or profile.
    #[must_use]
    pub fn new(identifier: impl Into<String>, provider_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier: identifier.into(),
            provider_name: provider_name.into(),
            roles: Vec::new(),
            credentials_source: None,
            profile: None,
            created_at: OffsetDateTime::now_utc(),
            last_successful_authentication_at: None,
            failed_authentication_count: 0,
        }
    }

    /// Replaces the account roles, dropping duplicate identifiers.
    pub fn set_roles(&mut self, roles: Vec<Role>) {
        self.roles.clear();
        for role in roles {
            if !self.has_role(&role.identifier) {
                self.roles.push(role);
            }
        }
    }

    /// Returns `true` if the account has the role with the given identifier.
    #[must_use]
    pub fn has_role(&self, identifier: &str) -> bool {
        self.roles.iter().any(|r| r.identifier == identifier)
    }

    /// Stores the credential used for future sessions.
    pub fn set_credentials_source(&mut self, credentials: impl Into<String>) {
        self.credentials_source = Some(credentials.into());
    }

    /// Records the outcome of an authentication attempt.
    ///
    /// A successful attempt stamps the time and resets the failure counter;
    /// wrong credentials increment it.
    pub fn authentication_attempted(&mut self, status: AuthenticationStatus) {
        match status {
            AuthenticationStatus::AuthenticationSuccessful => {
                self.last_successful_authentication_at = Some(OffsetDateTime::now_utc());
                self.failed_authentication_count = 0;
            }
            AuthenticationStatus::WrongCredentials => {
                self.failed_authentication_count = self.failed_authentication_count.saturating_add(1);
            }
            AuthenticationStatus::NoCredentials => {}
        }
    }

    /// Returns the storage key `(identifier, provider_name)`.
    #[must_use]
    pub fn key(&self) -> (String, String) {
        (self.identifier.clone(), self.provider_name.clone())
    }
}

// =============================================================================
// System Lookup Capability
// =============================================================================

/// Permission to read an account without caller-side authorization.
///
/// The authentication provider has to find the account before a security
/// context exists, so the lookup cannot be authorized against one. Only this
/// crate can create the value; it is created for a single lookup call and
/// dropped right after, so repositories never hold elevated access.
#[derive(Debug)]
pub struct SystemLookup {
    _private: (),
}

impl SystemLookup {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

// =============================================================================
// Account Repository Trait
// =============================================================================

/// Storage operations for accounts.
///
/// # Example
///
/// ```ignore
/// use google_signin_auth::storage::AccountRepository;
///
/// async fn example(repository: &impl AccountRepository, lookup: &SystemLookup) {
///     if let Some(account) = repository
///         .find_by_identifier_and_provider("1234", "GoogleOAuth2Provider", lookup)
///         .await?
///     {
///         println!("Found account {}", account.id);
///     }
/// }
/// ```
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Finds the account for a provider-scoped identifier.
    ///
    /// Implementations must not require caller-side authorization for this
    /// call; holding a [`SystemLookup`] is the authorization.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_identifier_and_provider(
        &self,
        identifier: &str,
        provider_name: &str,
        lookup: &SystemLookup,
    ) -> AuthResult<Option<Account>>;

    /// Adds a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountConflict` if an account with the same
    /// identifier and provider already exists, or a storage error.
    async fn add(&self, account: &Account) -> AuthResult<()>;

    /// Updates an existing account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or the storage
    /// operation fails.
    async fn update(&self, account: &Account) -> AuthResult<()>;
}
