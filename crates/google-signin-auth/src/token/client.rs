//! The client token presented for authentication.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage::Account;

/// Kind reported by [`ClientToken`].
pub const GOOGLE_TOKEN_KIND: &str = "google-oauth2";

/// Outcome of authenticating a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationStatus {
    /// No credentials were presented, or the token was not processed yet.
    NoCredentials,
    /// The identity provider did not vouch for the credentials.
    WrongCredentials,
    /// The identity provider vouched for the credentials.
    AuthenticationSuccessful,
}

impl AuthenticationStatus {
    /// Returns `true` for [`AuthenticationStatus::AuthenticationSuccessful`].
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::AuthenticationSuccessful)
    }
}

impl fmt::Display for AuthenticationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no_credentials"),
            Self::WrongCredentials => write!(f, "wrong_credentials"),
            Self::AuthenticationSuccessful => write!(f, "authentication_successful"),
        }
    }
}

/// Credentials obtained by the client from the identity provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Short-lived access token.
    pub access_token: String,

    /// OpenID Connect ID token; not every client flow supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl Credentials {
    /// Creates credentials with an access token only.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: None,
        }
    }

    /// Adds an ID token.
    #[must_use]
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    /// Returns `true` if no access token is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"***")
            .field("id_token", &self.id_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// A token an authentication provider may be asked to authenticate.
///
/// Providers check [`kind`](Self::kind) before touching a token and reject
/// kinds they do not handle.
pub trait AuthenticationToken: Send + fmt::Debug {
    /// Identifies the token implementation.
    fn kind(&self) -> &str;

    /// Current authentication status.
    fn authentication_status(&self) -> AuthenticationStatus;

    /// Access to the concrete token.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Token carrying credentials issued by Google to the client.
#[derive(Debug, Clone)]
pub struct ClientToken {
    credentials: Credentials,
    status: AuthenticationStatus,
    account: Option<Account>,
}

impl ClientToken {
    /// Creates an unauthenticated token for the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            status: AuthenticationStatus::NoCredentials,
            account: None,
        }
    }

    /// Returns the presented credentials.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the authentication status.
    #[must_use]
    pub fn status(&self) -> AuthenticationStatus {
        self.status
    }

    /// Sets the authentication status.
    pub fn set_status(&mut self, status: AuthenticationStatus) {
        self.status = status;
    }

    /// Returns `true` once the token has been authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status.is_authenticated()
    }

    /// Returns the account the token belongs to, once known.
    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Attaches the owning account.
    pub fn set_account(&mut self, account: Account) {
        self.account = Some(account);
    }
}

impl AuthenticationToken for ClientToken {
    fn kind(&self) -> &str {
        GOOGLE_TOKEN_KIND
    }

    fn authentication_status(&self) -> AuthenticationStatus {
        self.status
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_is_unauthenticated() {
        let token = ClientToken::new(Credentials::new("access").with_id_token("id"));
        assert_eq!(token.status(), AuthenticationStatus::NoCredentials);
        assert!(!token.is_authenticated());
        assert!(token.account().is_none());
        assert_eq!(token.credentials().id_token.as_deref(), Some("id"));
        assert_eq!(token.kind(), GOOGLE_TOKEN_KIND);
    }

    #[test]
    fn test_set_status_and_account() {
        let mut token = ClientToken::new(Credentials::new("access"));
        token.set_status(AuthenticationStatus::AuthenticationSuccessful);
        token.set_account(Account::new("999", "google"));

        assert!(token.is_authenticated());
        assert_eq!(token.authentication_status(), AuthenticationStatus::AuthenticationSuccessful);
        assert_eq!(token.account().map(|a| a.identifier.as_str()), Some("999"));
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let mut token = ClientToken::new(Credentials::new("access"));
        let dynamic: &mut dyn AuthenticationToken = &mut token;
        assert!(dynamic.as_any_mut().downcast_mut::<ClientToken>().is_some());
    }

    #[test]
    fn test_credentials_debug_hides_tokens() {
        let credentials = Credentials::new("ya29.secret").with_id_token("eyJ.secret");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("secret"));
        assert!(Credentials::new("").is_empty());
    }

    #[test]
    fn test_credentials_deserialize_without_id_token() {
        let credentials: Credentials =
            serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(credentials.access_token, "abc");
        assert!(credentials.id_token.is_none());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AuthenticationStatus::WrongCredentials.to_string(), "wrong_credentials");
        assert_eq!(
            serde_json::to_value(AuthenticationStatus::AuthenticationSuccessful).unwrap(),
            "authentication_successful"
        );
    }
}
