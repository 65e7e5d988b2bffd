//! Collaborators shared by the provider and the provisioning flow.

use std::sync::Arc;

use crate::config::GoogleProviderConfig;
use crate::http::HttpTransport;
use crate::provisioning::{ProfileValidator, RequiredFieldsValidator};
use crate::storage::{
    AccountRepository, InMemoryStore, PersistenceManager, ProfileRepository, RoleResolver,
};

/// Everything the authentication provider depends on.
///
/// Assembled once at startup and shared through `Arc`s.
#[derive(Clone)]
pub struct AuthContext {
    /// Provider configuration.
    pub config: Arc<GoogleProviderConfig>,

    /// Account lookup and writes.
    pub accounts: Arc<dyn AccountRepository>,

    /// Profile creation.
    pub profiles: Arc<dyn ProfileRepository>,

    /// Resolution of configured role identifiers.
    pub roles: Arc<dyn RoleResolver>,

    /// Flushes pending writes.
    pub persistence: Arc<dyn PersistenceManager>,

    /// Outbound HTTP.
    pub transport: Arc<dyn HttpTransport>,

    /// Validation of provisioned profiles.
    pub profile_validator: Arc<dyn ProfileValidator>,
}

impl AuthContext {
    /// Creates a context with the default profile validator.
    pub fn new(
        config: GoogleProviderConfig,
        accounts: Arc<dyn AccountRepository>,
        profiles: Arc<dyn ProfileRepository>,
        roles: Arc<dyn RoleResolver>,
        persistence: Arc<dyn PersistenceManager>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            accounts,
            profiles,
            roles,
            persistence,
            transport,
            profile_validator: Arc::new(RequiredFieldsValidator),
        }
    }

    /// Creates a context whose repositories and persistence manager are all
    /// backed by one [`InMemoryStore`].
    pub fn in_memory(
        config: GoogleProviderConfig,
        store: Arc<InMemoryStore>,
        roles: Arc<dyn RoleResolver>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self::new(
            config,
            store.clone(),
            store.clone(),
            roles,
            store,
            transport,
        )
    }

    /// Replaces the profile validator.
    #[must_use]
    pub fn with_profile_validator(mut self, validator: Arc<dyn ProfileValidator>) -> Self {
        self.profile_validator = validator;
        self
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
