//! Authentication error types.
//!
//! Only hard failures live here. A token whose claims do not match this
//! application (wrong audience, missing subject) is not an error: the token
//! endpoint returns it as a rejected introspection and the provider maps it
//! to [`AuthenticationStatus::WrongCredentials`].
//!
//! [`AuthenticationStatus::WrongCredentials`]: crate::token::AuthenticationStatus::WrongCredentials

use std::fmt;

use crate::http::TransportError;

/// Errors that can occur while authenticating a client token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider was handed a token kind it does not authenticate.
    #[error("This provider cannot authenticate the given token (kind: {kind})")]
    UnsupportedTokenKind {
        /// Kind reported by the rejected token.
        kind: String,
    },

    /// The identity provider answered with an unexpected status or body.
    #[error("The response was not of type 200 but gave code and error {status} \"{body}\"")]
    RemoteProtocol {
        /// HTTP status code returned by the remote endpoint.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A remote response could not be decoded.
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse {
        /// Endpoint that produced the response.
        endpoint: String,
        /// Description of the decoding problem.
        message: String,
    },

    /// The profile built from remote user data failed validation.
    #[error("The created profile does not satisfy the requirements: {}", .violations.join("; "))]
    InvalidProfileData {
        /// Human-readable descriptions of the violated rules.
        violations: Vec<String>,
    },

    /// An account with the same identifier and provider already exists.
    #[error("Account '{identifier}' already exists for provider '{provider}'")]
    AccountConflict {
        /// Provider-scoped account identifier.
        identifier: String,
        /// Authentication provider name.
        provider: String,
    },

    /// A configured role identifier could not be resolved.
    #[error("Unknown role: {role}")]
    UnknownRole {
        /// The unresolved role identifier.
        role: String,
    },

    /// An error occurred while storing or retrieving account data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The provider configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },

    /// The HTTP transport failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl From<crate::config::ConfigError> for AuthError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

impl AuthError {
    /// Creates a new `UnsupportedTokenKind` error.
    #[must_use]
    pub fn unsupported_token_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedTokenKind { kind: kind.into() }
    }

    /// Creates a new `RemoteProtocol` error.
    #[must_use]
    pub fn remote_protocol(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteProtocol {
            status,
            body: body.into(),
        }
    }

    /// Creates a new `MalformedResponse` error.
    #[must_use]
    pub fn malformed_response(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidProfileData` error.
    #[must_use]
    pub fn invalid_profile_data(violations: Vec<String>) -> Self {
        Self::InvalidProfileData { violations }
    }

    /// Creates a new `AccountConflict` error.
    #[must_use]
    pub fn account_conflict(identifier: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::AccountConflict {
            identifier: identifier.into(),
            provider: provider.into(),
        }
    }

    /// Creates a new `UnknownRole` error.
    #[must_use]
    pub fn unknown_role(role: impl Into<String>) -> Self {
        Self::UnknownRole { role: role.into() }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the error was caused by the caller rather than by
    /// infrastructure.
    ///
    /// Only an unsupported token kind qualifies; it is a programming error in
    /// the code that routes tokens to providers.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnsupportedTokenKind { .. })
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns `true` if the error originates from a remote endpoint or the
    /// network path to it.
    #[must_use]
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            Self::RemoteProtocol { .. } | Self::MalformedResponse { .. } | Self::Transport(_)
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedTokenKind { .. } => ErrorCategory::Programming,
            Self::RemoteProtocol { .. } => ErrorCategory::Federation,
            Self::MalformedResponse { .. } => ErrorCategory::Federation,
            Self::InvalidProfileData { .. } => ErrorCategory::Provisioning,
            Self::AccountConflict { .. } => ErrorCategory::Infrastructure,
            Self::UnknownRole { .. } => ErrorCategory::Configuration,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
            Self::Transport(_) => ErrorCategory::Transport,
        }
    }

    /// Returns the HTTP status an outer handler should answer with.
    ///
    /// Every error here is an authentication-system failure, so all of them
    /// map to the 5xx range; bad user input never reaches this type.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RemoteProtocol { .. } | Self::MalformedResponse { .. } => 502,
            Self::Transport(TransportError::Timeout(_)) => 504,
            Self::Transport(_) => 502,
            _ => 500,
        }
    }
}

/// Categories of authentication errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Misuse of the provider API.
    Programming,
    /// Identity provider protocol errors.
    Federation,
    /// First-login profile provisioning errors.
    Provisioning,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Network errors.
    Transport,
    /// Internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Programming => write!(f, "programming"),
            Self::Federation => write!(f, "federation"),
            Self::Provisioning => write!(f, "provisioning"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Transport => write!(f, "transport"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
