//! Profile type and repository trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;

/// Kind of an electronic address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectronicAddressType {
    Email,
}

/// An address such as an email, with its approval state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectronicAddress {
    /// Address kind.
    #[serde(rename = "type")]
    pub address_type: ElectronicAddressType,

    /// The address itself.
    pub identifier: String,

    /// Whether the address is confirmed to belong to the person.
    pub approved: bool,
}

impl ElectronicAddress {
    /// Creates an unapproved email address.
    #[must_use]
    pub fn email(identifier: impl Into<String>) -> Self {
        Self {
            address_type: ElectronicAddressType::Email,
            identifier: identifier.into(),
            approved: false,
        }
    }

    /// Marks the address as approved.
    #[must_use]
    pub fn approved(mut self) -> Self {
        self.approved = true;
        self
    }
}

/// A person's profile attached to an account on first login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Storage identifier.
    pub id: Uuid,

    /// Given (first) name.
    pub given_name: String,

    /// Family (last) name.
    pub family_name: String,

    /// Primary electronic address.
    pub primary_electronic_address: ElectronicAddress,

    /// When the profile was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Profile {
    /// Creates a profile whose primary address is the given, approved email.
    ///
    /// Addresses from the identity provider are verified by the provider, so
    /// they are approved on creation.
    #[must_use]
    pub fn new(
        given_name: impl Into<String>,
        family_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            given_name: given_name.into(),
            family_name: family_name.into(),
            primary_electronic_address: ElectronicAddress::email(email).approved(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Returns the primary email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.primary_electronic_address.identifier
    }

    /// Returns "given family", skipping empty parts.
    #[must_use]
    pub fn full_name(&self) -> String {
        [self.given_name.as_str(), self.family_name.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Storage operations for profiles.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Adds a new profile.
    ///
    /// # Errors
    ///
    /// Returns an error if a profile with the same id exists or the storage
    /// operation fails.
    async fn add(&self, profile: &Profile) -> AuthResult<()>;
}
