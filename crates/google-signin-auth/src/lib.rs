//! # google-signin-auth
//!
//! Server-side "Sign in with Google" authentication.
//!
//! This crate provides:
//! - Introspection of client access tokens with audience checks
//! - Account lookup and creation keyed on the Google subject
//! - Exchange of short-lived tokens for long-lived credentials
//! - Optional profile provisioning on first login
//! - Signed (`appsecret_proof`) calls to the Google API host
//!
//! ## Overview
//!
//! A client completes the Google OAuth flow on its own and hands the
//! resulting credentials to the server wrapped in a [`ClientToken`]. The
//! [`GoogleAuthenticationProvider`] decides whether Google vouches for
//! them, links the token to a local [`Account`] and updates the token's
//! [`AuthenticationStatus`].
//!
//! ```ignore
//! use std::sync::Arc;
//! use google_signin_auth::prelude::*;
//!
//! let config = GoogleProviderConfig::load(None)?;
//! let transport = Arc::new(ReqwestTransport::new(config.http.request_timeout)?);
//! let store = Arc::new(InMemoryStore::new());
//! let roles = Arc::new(StaticRoleResolver::from_identifiers(config.authenticate_roles.clone()));
//! let provider = GoogleAuthenticationProvider::new(
//!     AuthContext::in_memory(config, store, roles, transport),
//! )?;
//!
//! let mut token = ClientToken::new(Credentials::new(access_token));
//! provider.authenticate(&mut token).await?;
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Provider configuration and loading
//! - [`token`] - Client tokens, introspection and token exchange
//! - [`provider`] - The authentication provider
//! - [`provisioning`] - First-login profile creation
//! - [`api_client`] - Signed API requests
//! - [`storage`] - Repository traits and the in-memory store
//! - [`http`] - HTTP transport abstraction

pub mod api_client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod provider;
pub mod provisioning;
pub mod storage;
pub mod token;

pub use api_client::{RemoteApiClient, appsecret_proof};
pub use config::{ConfigError, EndpointConfig, GoogleProviderConfig, HttpConfig};
pub use context::AuthContext;
pub use error::{AuthError, ErrorCategory};
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError};
pub use provider::GoogleAuthenticationProvider;
pub use provisioning::{ProfileProvisioningFlow, ProfileValidator, RequiredFieldsValidator};
pub use storage::{
    Account, AccountRepository, InMemoryStore, PersistenceManager, Profile, ProfileRepository,
    Role, RoleResolver, StaticRoleResolver,
};
pub use token::{
    AuthenticationStatus, AuthenticationToken, ClientToken, Credentials, Introspection,
    RejectionReason, TokenEndpoint, TokenIntrospectionResult, TokenResponse,
};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use google_signin_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::api_client::{RemoteApiClient, appsecret_proof};
    pub use crate::config::{ConfigError, GoogleProviderConfig};
    pub use crate::context::AuthContext;
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{HttpTransport, ReqwestTransport};
    pub use crate::provider::GoogleAuthenticationProvider;
    pub use crate::storage::{InMemoryStore, StaticRoleResolver};
    pub use crate::token::{
        AuthenticationStatus, AuthenticationToken, ClientToken, Credentials, Introspection,
    };
}
