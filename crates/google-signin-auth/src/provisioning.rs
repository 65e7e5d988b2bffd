//! First-login profile provisioning.
//!
//! When an account is created and profile creation is enabled, the
//! provider fetches the user's extended profile, validates it and attaches
//! it to the account.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::api_client::RemoteApiClient;
use crate::context::AuthContext;
use crate::http::Method;
use crate::storage::{AccountRepository, PersistenceManager, Profile, ProfileRepository};
use crate::token::ClientToken;
use crate::token::claims::claim_as_string;
use crate::{AuthError, AuthResult};

// =============================================================================
// Validation
// =============================================================================

/// Checks a freshly built profile before it is stored.
pub trait ProfileValidator: Send + Sync {
    /// Returns the violated rules, if any.
    ///
    /// # Errors
    ///
    /// Returns one message per violated rule.
    fn validate(&self, profile: &Profile) -> Result<(), Vec<String>>;
}

/// Requires both names and a plausible email address.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFieldsValidator;

impl ProfileValidator for RequiredFieldsValidator {
    fn validate(&self, profile: &Profile) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();

        if profile.given_name.trim().is_empty() {
            violations.push("given name must not be empty".to_string());
        }
        if profile.family_name.trim().is_empty() {
            violations.push("family name must not be empty".to_string());
        }

        let email = profile.email();
        if email.trim().is_empty() {
            violations.push("primary email address must not be empty".to_string());
        } else if !email.contains('@') {
            violations.push(format!("'{email}' is not a valid email address"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

// =============================================================================
// Flow
// =============================================================================

/// Creates the profile of a newly created account.
pub struct ProfileProvisioningFlow {
    api: Arc<RemoteApiClient>,
    accounts: Arc<dyn AccountRepository>,
    profiles: Arc<dyn ProfileRepository>,
    persistence: Arc<dyn PersistenceManager>,
    validator: Arc<dyn ProfileValidator>,
    user_info_path: String,
}

impl ProfileProvisioningFlow {
    /// Creates the flow from the shared context and API client.
    #[must_use]
    pub fn new(context: &AuthContext, api: Arc<RemoteApiClient>) -> Self {
        Self {
            api,
            accounts: context.accounts.clone(),
            profiles: context.profiles.clone(),
            persistence: context.persistence.clone(),
            validator: context.profile_validator.clone(),
            user_info_path: context.config.endpoints.user_info_path.clone(),
        }
    }

    /// Fetches the user's profile, validates it and attaches it to the
    /// token's account.
    ///
    /// The account update and the profile are persisted and flushed before
    /// returning; the token is updated with the stored account.
    ///
    /// # Errors
    ///
    /// - `AuthError::Internal` if the token has no account yet
    /// - `AuthError::RemoteProtocol` if the profile endpoint does not answer 2xx
    /// - `AuthError::MalformedResponse` if the body is not a JSON object
    /// - `AuthError::InvalidProfileData` if validation fails
    /// - storage errors from the repositories
    #[instrument(skip_all)]
    pub async fn create_profile_for(&self, token: &mut ClientToken) -> AuthResult<Profile> {
        let mut account = token
            .account()
            .cloned()
            .ok_or_else(|| AuthError::internal("cannot provision a profile for a token without account"))?;

        let response = self
            .api
            .query(&self.user_info_path, Method::Get, &token.credentials().access_token)
            .await?;
        if !response.is_success() {
            return Err(AuthError::remote_protocol(response.status, response.body));
        }

        let user_data: Value = serde_json::from_str(&response.body)
            .map_err(|e| AuthError::malformed_response(&self.user_info_path, e.to_string()))?;
        let Value::Object(user_data) = user_data else {
            return Err(AuthError::malformed_response(
                &self.user_info_path,
                "expected a JSON object",
            ));
        };

        let profile = Profile::new(
            claim_as_string(user_data.get("given_name")),
            claim_as_string(user_data.get("family_name")),
            claim_as_string(user_data.get("email")),
        );

        self.validator
            .validate(&profile)
            .map_err(AuthError::invalid_profile_data)?;

        account.profile = Some(profile.clone());
        self.accounts.update(&account).await?;
        self.profiles.add(&profile).await?;
        self.persistence.persist_all().await?;

        info!(
            account = %account.identifier,
            profile_id = %profile.id,
            "Profile created for new account"
        );

        token.set_account(account);
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_profile_passes() {
        let profile = Profile::new("Ada", "Lovelace", "ada@example.com");
        assert!(RequiredFieldsValidator.validate(&profile).is_ok());
    }

    #[test]
    fn test_empty_names_are_reported() {
        let profile = Profile::new("", " ", "a@b.com");
        let violations = RequiredFieldsValidator.validate(&profile).unwrap_err();
        assert_eq!(
            violations,
            vec![
                "given name must not be empty".to_string(),
                "family name must not be empty".to_string(),
            ]
        );
    }

    #[test]
    fn test_email_is_checked() {
        let missing = Profile::new("Ada", "Lovelace", "");
        assert_eq!(RequiredFieldsValidator.validate(&missing).unwrap_err().len(), 1);

        let invalid = Profile::new("Ada", "Lovelace", "not-an-email");
        let violations = RequiredFieldsValidator.validate(&invalid).unwrap_err();
        assert!(violations[0].contains("not-an-email"));
    }
}
