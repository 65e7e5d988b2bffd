//! Client tokens, introspection claims and the remote token endpoint.
//!
//! - [`client`] - the per-request token handed to the provider
//! - [`claims`] - decoded introspection results and soft rejections
//! - [`endpoint`] - introspection and long-lived token exchange

pub mod claims;
pub mod client;
pub mod endpoint;

pub use claims::{Introspection, RejectionReason, TokenIntrospectionResult};
pub use client::{
    AuthenticationStatus, AuthenticationToken, ClientToken, Credentials, GOOGLE_TOKEN_KIND,
};
pub use endpoint::{TokenEndpoint, TokenResponse};
