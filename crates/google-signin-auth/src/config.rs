//! Provider configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! provider_name = "GoogleOAuth2Provider"
//! client_id = "1234567890-abc.apps.googleusercontent.com"
//! client_secret = "..."
//! scopes = ["openid", "email", "profile"]
//! enable_profile_creation = true
//! authenticate_roles = ["Acme.Site:User"]
//!
//! [http]
//! request_timeout = "10s"
//! ```
//!
//! Every value can be overridden from the environment with the `GSIGNIN`
//! prefix and `__` as the section separator, e.g.
//! `GSIGNIN__CLIENT_SECRET=...` or `GSIGNIN__HTTP__REQUEST_TIMEOUT=5s`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default name under which accounts are stored.
pub const DEFAULT_PROVIDER_NAME: &str = "GoogleOAuth2Provider";

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "gsignin.toml";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "GSIGNIN";

/// Root configuration of the Google authentication provider.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GoogleProviderConfig {
    /// Name of this authentication provider. Accounts are keyed on
    /// `(sub, provider_name)`, so changing it orphans existing accounts.
    pub provider_name: String,

    /// OAuth client identifier. Introspected tokens must carry it as `aud`.
    pub client_id: String,

    /// OAuth client secret, sent with token-issuance requests.
    pub client_secret: String,

    /// Secret used to sign API calls (`appsecret_proof`).
    /// Falls back to `client_secret` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,

    /// OAuth scopes requested from the identity provider.
    pub scopes: Vec<String>,

    /// Create a profile from remote user data on first login.
    pub enable_profile_creation: bool,

    /// Role identifiers granted to newly created accounts.
    pub authenticate_roles: Vec<String>,

    /// Remote endpoints.
    pub endpoints: EndpointConfig,

    /// Outbound HTTP settings.
    pub http: HttpConfig,
}

impl Default for GoogleProviderConfig {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            app_secret: None,
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            enable_profile_creation: false,
            authenticate_roles: Vec::new(),
            endpoints: EndpointConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for GoogleProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleProviderConfig")
            .field("provider_name", &self.provider_name)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("app_secret", &self.app_secret.as_deref().map(redact))
            .field("scopes", &self.scopes)
            .field("enable_profile_creation", &self.enable_profile_creation)
            .field("authenticate_roles", &self.authenticate_roles)
            .field("endpoints", &self.endpoints)
            .field("http", &self.http)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "***" }
}

/// Remote endpoint locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Token introspection endpoint.
    pub token_info: String,

    /// Token issuance endpoint used for the long-lived token exchange.
    pub token: String,

    /// Base URL of the API host that serves profile data.
    pub api_base: String,

    /// Resource path of the extended profile, relative to `api_base`.
    pub user_info_path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            token_info: "https://www.googleapis.com/oauth2/v3/tokeninfo".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            api_base: "https://www.googleapis.com".to_string(),
            user_info_path: "/userinfo/v2/me".to_string(),
        }
    }
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout. Unset means the transport default (no timeout).
    #[serde(
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_timeout: Option<Duration>,
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration sources could not be read or merged.
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl GoogleProviderConfig {
    /// Creates a configuration for the given client credentials, all other
    /// values at their defaults.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Sets the provider name.
    #[must_use]
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    /// Sets a dedicated `appsecret_proof` signing secret.
    #[must_use]
    pub fn with_app_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(secret.into());
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Enables or disables profile creation on first login.
    #[must_use]
    pub fn with_profile_creation(mut self, enabled: bool) -> Self {
        self.enable_profile_creation = enabled;
        self
    }

    /// Adds a role granted to new accounts.
    #[must_use]
    pub fn with_authenticate_role(mut self, role: impl Into<String>) -> Self {
        self.authenticate_roles.push(role.into());
        self
    }

    /// Replaces the endpoint configuration.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Returns the secret used for `appsecret_proof`.
    #[must_use]
    pub fn effective_app_secret(&self) -> &str {
        self.app_secret.as_deref().unwrap_or(&self.client_secret)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the client id or secret is empty,
    /// and `ConfigError::InvalidValue` if an endpoint is not an absolute
    /// URL, the profile path does not start with `/`, or a role id is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "provider_name cannot be empty".to_string(),
            ));
        }

        if self.client_id.is_empty() {
            return Err(ConfigError::Missing("client_id".to_string()));
        }

        if self.client_secret.is_empty() {
            return Err(ConfigError::Missing("client_secret".to_string()));
        }

        if self.app_secret.as_deref() == Some("") {
            return Err(ConfigError::InvalidValue(
                "app_secret cannot be empty when set".to_string(),
            ));
        }

        for (name, value) in [
            ("endpoints.token_info", &self.endpoints.token_info),
            ("endpoints.token", &self.endpoints.token),
            ("endpoints.api_base", &self.endpoints.api_base),
        ] {
            let url = Url::parse(value).map_err(|e| {
                ConfigError::InvalidValue(format!("{name} is not a valid URL ({value}): {e}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must use http or https, got '{}'",
                    url.scheme()
                )));
            }
        }

        if !self.endpoints.user_info_path.starts_with('/') {
            return Err(ConfigError::InvalidValue(format!(
                "endpoints.user_info_path must start with '/', got '{}'",
                self.endpoints.user_info_path
            )));
        }

        if let Some(role) = self
            .authenticate_roles
            .iter()
            .find(|r| r.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue(format!(
                "authenticate_roles contains a blank role identifier: '{role}'"
            )));
        }

        if self.http.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidValue(
                "http.request_timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Loads the configuration from a TOML file and `GSIGNIN__*` environment
    /// overrides, then validates it.
    ///
    /// Without an explicit path, `gsignin.toml` in the working directory is
    /// used if present. An explicit path that does not exist is an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source cannot be read or deserialized,
    /// or any error from [`validate`](Self::validate).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::Load(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                builder = builder.add_source(config::File::from(p.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(config::File::from(default_path));
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("scopes")
                .with_list_parse_key("authenticate_roles"),
        );

        let merged: Self = builder
            .build()
            .map_err(|e| ConfigError::Load(format!("config build error: {e}")))?
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("config deserialize error: {e}")))?;

        merged.validate()?;

        tracing::debug!(
            provider = %merged.provider_name,
            client_id = %merged.client_id,
            profile_creation = merged.enable_profile_creation,
            "Loaded provider configuration"
        );

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn valid_config() -> GoogleProviderConfig {
        GoogleProviderConfig::new("client-123", "s3cret")
    }

    #[test]
    fn test_default_config() {
        let config = GoogleProviderConfig::default();
        assert_eq!(config.provider_name, DEFAULT_PROVIDER_NAME);
        assert_eq!(config.scopes, vec!["openid", "email", "profile"]);
        assert!(!config.enable_profile_creation);
        assert!(config.authenticate_roles.is_empty());
        assert!(config.http.request_timeout.is_none());
        assert_eq!(config.endpoints.user_info_path, "/userinfo/v2/me");
    }

    #[test]
    fn test_default_config_needs_credentials() {
        let err = GoogleProviderConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref f) if f == "client_id"));

        let err = GoogleProviderConfig::new("client-123", "")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref f) if f == "client_secret"));

        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = valid_config()
            .with_provider_name("Google")
            .with_app_secret("proof-key")
            .with_scopes(vec!["email".to_string()])
            .with_profile_creation(true)
            .with_authenticate_role("Acme:User")
            .with_authenticate_role("Acme:Reader");

        assert_eq!(config.provider_name, "Google");
        assert_eq!(config.effective_app_secret(), "proof-key");
        assert_eq!(config.scopes, vec!["email"]);
        assert!(config.enable_profile_creation);
        assert_eq!(config.authenticate_roles, vec!["Acme:User", "Acme:Reader"]);
    }

    #[test]
    fn test_app_secret_falls_back_to_client_secret() {
        assert_eq!(valid_config().effective_app_secret(), "s3cret");
    }

    #[test]
    fn test_invalid_endpoint_fails_validation() {
        let mut config = valid_config();
        config.endpoints.token_info = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("endpoints.token_info"));

        let mut config = valid_config();
        config.endpoints.api_base = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));

        let mut config = valid_config();
        config.endpoints.user_info_path = "userinfo".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("user_info_path"));
    }

    #[test]
    fn test_blank_role_fails_validation() {
        let config = valid_config().with_authenticate_role("  ");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("authenticate_roles"));
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let mut config = valid_config();
        config.http.request_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = valid_config().with_app_secret("proof-key");
        let debug = format!("{config:?}");
        assert!(debug.contains("client-123"));
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("proof-key"));
    }

    #[test]
    fn test_deserialize_toml_with_duration() {
        let toml = r#"
            client_id = "client-123"
            client_secret = "s3cret"
            enable_profile_creation = true
            authenticate_roles = ["Acme:User"]

            [http]
            request_timeout = "15s"
        "#;

        let config: GoogleProviderConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.http.request_timeout, Some(Duration::from_secs(15)));
        assert!(config.enable_profile_creation);
        assert_eq!(config.provider_name, DEFAULT_PROVIDER_NAME);
        assert_eq!(config.scopes.len(), 3);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
client_id = "from-file"
client_secret = "file-secret"
provider_name = "FileProvider"
"#
        )
        .unwrap();

        let config = GoogleProviderConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.client_id, "from-file");
        assert_eq!(config.provider_name, "FileProvider");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = GoogleProviderConfig::load(Some(Path::new("/nonexistent/gsignin.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue("test error".to_string());
        assert_eq!(err.to_string(), "Invalid configuration value: test error");

        let err = ConfigError::Missing("client_id".to_string());
        assert_eq!(err.to_string(), "Missing required configuration: client_id");
    }
}
