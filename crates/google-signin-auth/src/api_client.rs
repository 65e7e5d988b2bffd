//! Signed calls to the Google API host.
//!
//! Every request carries the caller's access token together with an
//! `appsecret_proof`: the hex HMAC-SHA256 of the token keyed with the app
//! secret. The client holds no per-user state and can be shared freely.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use url::Url;

use crate::config::GoogleProviderConfig;
use crate::http::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

const ACCESS_TOKEN_PARAM: &str = "access_token";
const APPSECRET_PROOF_PARAM: &str = "appsecret_proof";

/// Computes `hex(HMAC-SHA256(key = app_secret, message = access_token))`.
#[must_use]
pub fn appsecret_proof(app_secret: &str, access_token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(access_token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Client for authenticated API resources.
pub struct RemoteApiClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    app_secret: String,
}

impl RemoteApiClient {
    /// Creates a client for the configured API host.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if `endpoints.api_base` is not a URL.
    pub fn new(
        config: &GoogleProviderConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> AuthResult<Self> {
        let api_base = config.endpoints.api_base.trim_end_matches('/').to_string();
        Url::parse(&api_base).map_err(|e| {
            AuthError::configuration(format!("endpoints.api_base is not a valid URL ({api_base}): {e}"))
        })?;

        Ok(Self {
            transport,
            api_base,
            app_secret: config.effective_app_secret().to_string(),
        })
    }

    /// Sends a signed request for `resource` and returns the response as is.
    ///
    /// Query parameters already present in `resource` are kept, except
    /// `access_token` and `appsecret_proof`, which are replaced.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Transport` if no response was received, or
    /// `AuthError::Internal` if `resource` does not form a valid URL.
    pub async fn query(
        &self,
        resource: &str,
        method: Method,
        access_token: &str,
    ) -> AuthResult<HttpResponse> {
        let url = self.signed_url(resource, access_token)?;
        debug!(%method, path = url.path(), "Querying API resource");
        let response = self.transport.send(HttpRequest::new(method, url)).await?;
        Ok(response)
    }

    fn signed_url(&self, resource: &str, access_token: &str) -> AuthResult<Url> {
        let raw = format!("{}{}", self.api_base, resource);
        let mut url = Url::parse(&raw)
            .map_err(|e| AuthError::internal(format!("invalid API resource '{resource}': {e}")))?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != ACCESS_TOKEN_PARAM && k != APPSECRET_PROOF_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(ACCESS_TOKEN_PARAM, access_token)
            .append_pair(
                APPSECRET_PROOF_PARAM,
                &appsecret_proof(&self.app_secret, access_token),
            );

        Ok(url)
    }
}

impl std::fmt::Debug for RemoteApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteApiClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}
