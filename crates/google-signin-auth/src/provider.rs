//! The Google authentication provider.
//!
//! # Flow
//!
//! 1. Introspect the client's access token and check it was issued to this
//!    application. A rejected token ends the attempt with
//!    [`AuthenticationStatus::WrongCredentials`].
//! 2. Find the account for `(sub, provider name)`, creating it with the
//!    configured default roles on first login.
//! 3. Exchange the access token for a long-lived one and store it as the
//!    account's credentials source.
//! 4. For a new account, optionally provision a profile.
//!
//! Account creation and profile provisioning are not transactional: if
//! provisioning fails the account stays persisted and the token stays
//! authenticated.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::api_client::RemoteApiClient;
use crate::context::AuthContext;
use crate::provisioning::ProfileProvisioningFlow;
use crate::storage::{Account, Role, SystemLookup};
use crate::token::{
    AuthenticationStatus, AuthenticationToken, ClientToken, GOOGLE_TOKEN_KIND, Introspection,
    TokenEndpoint,
};
use crate::{AuthError, AuthResult};

const SUPPORTED_TOKEN_KINDS: &[&str] = &[GOOGLE_TOKEN_KIND];

/// Authenticates [`ClientToken`]s against Google.
pub struct GoogleAuthenticationProvider {
    context: AuthContext,
    endpoint: TokenEndpoint,
    provisioning: ProfileProvisioningFlow,
}

impl GoogleAuthenticationProvider {
    /// Creates the provider after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the configuration is invalid.
    pub fn new(context: AuthContext) -> AuthResult<Self> {
        context.config.validate()?;

        let endpoint = TokenEndpoint::new(&context.config, context.transport.clone())?;
        let api = Arc::new(RemoteApiClient::new(
            &context.config,
            context.transport.clone(),
        )?);
        let provisioning = ProfileProvisioningFlow::new(&context, api);

        Ok(Self {
            context,
            endpoint,
            provisioning,
        })
    }

    /// Name under which accounts of this provider are stored.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.context.config.provider_name
    }

    /// Token kinds this provider authenticates.
    #[must_use]
    pub fn supported_token_kinds(&self) -> &'static [&'static str] {
        SUPPORTED_TOKEN_KINDS
    }

    /// Returns `true` if the token is of a supported kind.
    #[must_use]
    pub fn can_authenticate(&self, token: &dyn AuthenticationToken) -> bool {
        SUPPORTED_TOKEN_KINDS.contains(&token.kind())
    }

    /// Configured scopes joined by spaces.
    #[must_use]
    pub fn build_scope_parameter(&self) -> String {
        self.context.config.scopes.join(" ")
    }

    /// Authenticates the token and updates its status and account.
    ///
    /// A token that Google does not vouch for is not an error: its status is
    /// set to [`AuthenticationStatus::WrongCredentials`] and `Ok` is
    /// returned. A token without access token keeps
    /// [`AuthenticationStatus::NoCredentials`].
    ///
    /// # Errors
    ///
    /// - `AuthError::UnsupportedTokenKind` for tokens other than [`ClientToken`]
    /// - remote, transport and storage errors from the individual steps
    /// - `AuthError::InvalidProfileData` if provisioning rejects the profile;
    ///   the account is persisted and the token authenticated at that point
    #[instrument(skip_all, fields(provider = %self.name()))]
    pub async fn authenticate(&self, token: &mut dyn AuthenticationToken) -> AuthResult<()> {
        let kind = token.kind().to_string();
        if !SUPPORTED_TOKEN_KINDS.contains(&kind.as_str()) {
            return Err(AuthError::unsupported_token_kind(kind));
        }
        let Some(token) = token.as_any_mut().downcast_mut::<ClientToken>() else {
            return Err(AuthError::unsupported_token_kind(kind));
        };

        if token.credentials().is_empty() {
            debug!("Token carries no access token");
            token.set_status(AuthenticationStatus::NoCredentials);
            return Ok(());
        }

        let scope = self.build_scope_parameter();
        debug!(%scope, "Validating client token");

        let credentials = token.credentials().clone();
        let claims = match self
            .endpoint
            .request_validated_token_information(&credentials)
            .await?
        {
            Introspection::Validated(claims) => claims,
            Introspection::Rejected(reason) => {
                info!(target: "security", %reason, "Authentication failed");
                token.set_status(AuthenticationStatus::WrongCredentials);
                return Ok(());
            }
        };

        token.set_status(AuthenticationStatus::AuthenticationSuccessful);

        let existing = {
            let lookup = SystemLookup::new();
            self.context
                .accounts
                .find_by_identifier_and_provider(claims.sub(), self.name(), &lookup)
                .await?
        };

        let (mut account, is_new) = match existing {
            Some(account) => (account, false),
            None => {
                let mut account = Account::new(claims.sub(), self.name());
                account.set_roles(self.resolve_default_roles().await?);
                self.context.accounts.add(&account).await?;
                info!(
                    target: "security",
                    account = %account.identifier,
                    roles = account.roles.len(),
                    "Account created"
                );
                (account, true)
            }
        };
        token.set_account(account.clone());

        let long_lived = self
            .endpoint
            .request_long_lived_token(&credentials.access_token)
            .await?;
        account.set_credentials_source(long_lived.access_token);
        account.authentication_attempted(AuthenticationStatus::AuthenticationSuccessful);

        self.context.accounts.update(&account).await?;
        self.context.persistence.persist_all().await?;
        token.set_account(account);

        info!(target: "security", account = %claims.sub(), new_account = is_new, "Authentication successful");

        if is_new && self.context.config.enable_profile_creation {
            self.provisioning.create_profile_for(token).await?;
        }

        Ok(())
    }

    async fn resolve_default_roles(&self) -> AuthResult<Vec<Role>> {
        let mut roles = Vec::with_capacity(self.context.config.authenticate_roles.len());
        for role_id in &self.context.config.authenticate_roles {
            roles.push(self.context.roles.resolve(role_id).await?);
        }
        Ok(roles)
    }
}

impl std::fmt::Debug for GoogleAuthenticationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAuthenticationProvider")
            .field("name", &self.name())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
