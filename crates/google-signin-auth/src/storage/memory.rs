//! In-memory storage for tests and the CLI.
//!
//! Writes go straight to `DashMap`s, so [`PersistenceManager::persist_all`]
//! only counts flushes. Uniqueness of `(identifier, provider_name)` is
//! enforced atomically on `add` through the map's entry API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::account::{Account, AccountRepository, SystemLookup};
use super::persistence::PersistenceManager;
use super::profile::{Profile, ProfileRepository};
use super::role::{Role, RoleResolver};
use crate::{AuthError, AuthResult};

/// Write counters, for asserting persistence behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub accounts_added: usize,
    pub accounts_updated: usize,
    pub profiles_added: usize,
    pub flushes: usize,
}

/// Account and profile store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: DashMap<(String, String), Account>,
    profiles: DashMap<Uuid, Profile>,
    accounts_added: AtomicUsize,
    accounts_updated: AtomicUsize,
    profiles_added: AtomicUsize,
    flushes: AtomicUsize,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored account, if any.
    #[must_use]
    pub fn account(&self, identifier: &str, provider_name: &str) -> Option<Account> {
        self.accounts
            .get(&(identifier.to_string(), provider_name.to_string()))
            .map(|a| a.value().clone())
    }

    /// Returns copies of all stored accounts.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.iter().map(|a| a.value().clone()).collect()
    }

    /// Returns copies of all stored profiles.
    #[must_use]
    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles.iter().map(|p| p.value().clone()).collect()
    }

    /// Returns the write counters.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            accounts_added: self.accounts_added.load(Ordering::SeqCst),
            accounts_updated: self.accounts_updated.load(Ordering::SeqCst),
            profiles_added: self.profiles_added.load(Ordering::SeqCst),
            flushes: self.flushes.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn find_by_identifier_and_provider(
        &self,
        identifier: &str,
        provider_name: &str,
        _lookup: &SystemLookup,
    ) -> AuthResult<Option<Account>> {
        Ok(self.account(identifier, provider_name))
    }

    async fn add(&self, account: &Account) -> AuthResult<()> {
        match self.accounts.entry(account.key()) {
            Entry::Occupied(_) => Err(AuthError::account_conflict(
                &account.identifier,
                &account.provider_name,
            )),
            Entry::Vacant(slot) => {
                slot.insert(account.clone());
                self.accounts_added.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        match self.accounts.get_mut(&account.key()) {
            Some(mut stored) => {
                *stored = account.clone();
                self.accounts_updated.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(AuthError::storage(format!(
                "cannot update unknown account '{}' for provider '{}'",
                account.identifier, account.provider_name
            ))),
        }
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn add(&self, profile: &Profile) -> AuthResult<()> {
        match self.profiles.entry(profile.id) {
            Entry::Occupied(_) => Err(AuthError::storage(format!(
                "profile {} already exists",
                profile.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(profile.clone());
                self.profiles_added.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl PersistenceManager for InMemoryStore {
    async fn persist_all(&self) -> AuthResult<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Resolves roles from a fixed set of known identifiers.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleResolver {
    roles: HashMap<String, Role>,
}

impl StaticRoleResolver {
    /// Creates a resolver that knows no roles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that knows the given role identifiers.
    #[must_use]
    pub fn from_identifiers<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = identifiers
            .into_iter()
            .map(|id| {
                let role = Role::new(id);
                (role.identifier.clone(), role)
            })
            .collect();
        Self { roles }
    }

    /// Adds a known role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role.identifier.clone(), role);
        self
    }
}

#[async_trait]
impl RoleResolver for StaticRoleResolver {
    async fn resolve(&self, role_id: &str) -> AuthResult<Role> {
        self.roles
            .get(role_id)
            .cloned()
            .ok_or_else(|| AuthError::unknown_role(role_id))
    }
}
