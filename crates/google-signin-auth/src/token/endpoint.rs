//! Token introspection and token issuance against the identity provider.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::claims::{Introspection, RejectionReason, TokenIntrospectionResult, decode_claims};
use super::client::Credentials;
use crate::config::GoogleProviderConfig;
use crate::http::{HttpRequest, HttpTransport};
use crate::{AuthError, AuthResult};

/// Successful response of the token-issuance endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenResponse {
    /// The issued access token.
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// OAuth 2.0 error body (RFC 6749 section 5.2).
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Client for the introspection and token-issuance endpoints.
pub struct TokenEndpoint {
    transport: Arc<dyn HttpTransport>,
    token_info_url: Url,
    token_url: Url,
    client_id: String,
    client_secret: String,
}

impl TokenEndpoint {
    /// Creates the endpoint client from the provider configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if an endpoint URL is invalid.
    pub fn new(
        config: &GoogleProviderConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> AuthResult<Self> {
        Ok(Self {
            transport,
            token_info_url: parse_endpoint("endpoints.token_info", &config.endpoints.token_info)?,
            token_url: parse_endpoint("endpoints.token", &config.endpoints.token)?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Client identifier that introspected tokens must be issued to.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Introspects the credentials and checks they were issued to this client.
    ///
    /// A token for another audience, one without a subject, or a 200 body
    /// that is not a JSON object is returned as [`Introspection::Rejected`].
    ///
    /// # Errors
    ///
    /// - `AuthError::RemoteProtocol` if the endpoint does not answer 200
    /// - `AuthError::Transport` if no response was received
    #[instrument(skip_all, fields(endpoint = %self.token_info_url))]
    pub async fn request_validated_token_information(
        &self,
        credentials: &Credentials,
    ) -> AuthResult<Introspection> {
        let mut url = self.token_info_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("input_token", &credentials.access_token);
            if let Some(id_token) = &credentials.id_token {
                query.append_pair("id_token", id_token);
            }
        }

        let response = self.transport.send(HttpRequest::get(url)).await?;
        if response.status != 200 {
            return Err(AuthError::remote_protocol(response.status, response.body));
        }

        let claims = match decode_claims(&response.body) {
            Ok(claims) => claims,
            Err(message) => {
                warn!(
                    target: "security",
                    client_identifier = %self.client_id,
                    error = %message,
                    "Google endpoint returned an unreadable token information response"
                );
                return Ok(Introspection::Rejected(RejectionReason::UnreadableResponse {
                    message,
                }));
            }
        };
        let result = TokenIntrospectionResult::from_claims(claims);

        if result.aud() != self.client_id {
            warn!(
                target: "security",
                response = ?result.claims(),
                client_identifier = %self.client_id,
                "Requesting validated token information from the Google endpoint did not succeed"
            );
            return Ok(Introspection::Rejected(RejectionReason::AudienceMismatch {
                expected: self.client_id.clone(),
                actual: result.aud().to_string(),
            }));
        }

        if result.sub().is_empty() {
            warn!(
                target: "security",
                client_identifier = %self.client_id,
                "Introspected token carries no subject"
            );
            return Ok(Introspection::Rejected(RejectionReason::MissingSubject));
        }

        debug!(sub = %result.sub(), "Token introspection succeeded");
        Ok(Introspection::Validated(result))
    }

    /// Exchanges a short-lived access token for a long-lived one.
    ///
    /// # Errors
    ///
    /// Same as [`request_access_token`](Self::request_access_token).
    pub async fn request_long_lived_token(&self, short_lived_token: &str) -> AuthResult<TokenResponse> {
        self.request_access_token("refresh_token", &[("refresh_token", short_lived_token)])
            .await
    }

    /// Posts a token request with the given grant type.
    ///
    /// `client_id` and `client_secret` are always included in the form.
    ///
    /// # Errors
    ///
    /// - `AuthError::RemoteProtocol` for a non-2xx answer
    /// - `AuthError::MalformedResponse` if the body has no `access_token`
    /// - `AuthError::Transport` if no response was received
    #[instrument(skip(self, params), fields(endpoint = %self.token_url))]
    pub async fn request_access_token(
        &self,
        grant_type: &str,
        params: &[(&str, &str)],
    ) -> AuthResult<TokenResponse> {
        let mut form = vec![
            ("grant_type".to_string(), grant_type.to_string()),
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
        ];
        form.extend(params.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));

        let response = self
            .transport
            .send(HttpRequest::post_form(self.token_url.clone(), form))
            .await?;

        if !response.is_success() {
            if let Ok(oauth_error) = response.json::<OAuthErrorResponse>() {
                warn!(
                    status = response.status,
                    error = %oauth_error.error,
                    description = oauth_error.error_description.as_deref().unwrap_or(""),
                    "Token endpoint returned an OAuth error"
                );
            }
            return Err(AuthError::remote_protocol(response.status, response.body));
        }

        let token: TokenResponse = response
            .json()
            .map_err(|e| AuthError::malformed_response(self.token_url.as_str(), e.to_string()))?;

        debug!(
            token_type = token.token_type.as_deref().unwrap_or(""),
            expires_in = token.expires_in,
            "Token issued"
        );
        Ok(token)
    }
}

impl std::fmt::Debug for TokenEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEndpoint")
            .field("token_info_url", &self.token_info_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

fn parse_endpoint(name: &str, value: &str) -> AuthResult<Url> {
    Url::parse(value)
        .map_err(|e| AuthError::configuration(format!("{name} is not a valid URL ({value}): {e}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::http::{HttpResponse, Method, TransportError};

    /// Returns one canned response and records the request.
    struct CannedTransport {
        response: Result<HttpResponse, TransportError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(HttpResponse::new(status, body)),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: TransportError) -> Arc<Self> {
            Arc::new(Self {
                response: Err(error),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl HttpTransport for CannedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.response.clone()
        }
    }

    fn endpoint(transport: Arc<CannedTransport>) -> TokenEndpoint {
        let config = GoogleProviderConfig::new("client-123", "client-secret");
        TokenEndpoint::new(&config, transport).unwrap()
    }

    #[tokio::test]
    async fn test_matching_audience_is_validated() {
        let transport = CannedTransport::new(200, r#"{"aud":"client-123","sub":"999"}"#);
        let endpoint = endpoint(transport.clone());

        let result = endpoint
            .request_validated_token_information(&Credentials::new("access").with_id_token("id"))
            .await
            .unwrap()
            .into_validated()
            .unwrap();
        assert_eq!(result.sub(), "999");

        let request = transport.last_request();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url.path(), "/oauth2/v3/tokeninfo");
        assert_eq!(request.query_param("input_token").as_deref(), Some("access"));
        assert_eq!(request.query_param("id_token").as_deref(), Some("id"));
    }

    #[tokio::test]
    async fn test_absent_id_token_is_omitted() {
        let transport = CannedTransport::new(200, r#"{"aud":"client-123","sub":"999"}"#);
        let endpoint = endpoint(transport.clone());

        endpoint
            .request_validated_token_information(&Credentials::new("access"))
            .await
            .unwrap();
        assert!(transport.last_request().query_param("id_token").is_none());
    }

    #[tokio::test]
    async fn test_foreign_audience_is_rejected() {
        let transport = CannedTransport::new(200, r#"{"aud":"other-client","sub":"999"}"#);
        let outcome = endpoint(transport)
            .request_validated_token_information(&Credentials::new("access"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Introspection::Rejected(RejectionReason::AudienceMismatch {
                expected: "client-123".to_string(),
                actual: "other-client".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_missing_subject_is_rejected() {
        let transport = CannedTransport::new(200, r#"{"aud":"client-123"}"#);
        let outcome = endpoint(transport)
            .request_validated_token_information(&Credentials::new("access"))
            .await
            .unwrap();
        assert_eq!(outcome, Introspection::Rejected(RejectionReason::MissingSubject));
    }

    #[tokio::test]
    async fn test_numeric_audience_matches_textually() {
        let transport = CannedTransport::new(200, r#"{"aud":12345678901234567890,"sub":98765432109876543210}"#);
        let config = GoogleProviderConfig::new("12345678901234567890", "secret");
        let endpoint = TokenEndpoint::new(&config, transport).unwrap();

        let result = endpoint
            .request_validated_token_information(&Credentials::new("access"))
            .await
            .unwrap()
            .into_validated()
            .unwrap();
        assert_eq!(result.sub(), "98765432109876543210");
    }

    #[tokio::test]
    async fn test_non_200_is_remote_protocol_error() {
        let transport = CannedTransport::new(400, r#"{"error":"invalid_token"}"#);
        let err = endpoint(transport)
            .request_validated_token_information(&Credentials::new("access"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::RemoteProtocol { status: 400, .. }));
        assert!(err.to_string().contains("invalid_token"));
    }

    #[tokio::test]
    async fn test_unreadable_body_is_rejected() {
        let too_deep = format!(
            r#"{{"aud":"client-123","sub":"999","x":{}1{}}}"#,
            "[".repeat(16),
            "]".repeat(16)
        );

        for body in ["[1,2,3]", "not json", "\"client-123\"", too_deep.as_str()] {
            let outcome = endpoint(CannedTransport::new(200, body))
                .request_validated_token_information(&Credentials::new("access"))
                .await
                .unwrap();
            assert!(
                matches!(
                    outcome,
                    Introspection::Rejected(RejectionReason::UnreadableResponse { .. })
                ),
                "body {body} gave {outcome:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = CannedTransport::failing(TransportError::Timeout("10s".to_string()));
        let err = endpoint(transport)
            .request_validated_token_information(&Credentials::new("access"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Transport(TransportError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_long_lived_token_exchange() {
        let transport = CannedTransport::new(
            200,
            r#"{"access_token":"long-lived","token_type":"Bearer","expires_in":3599}"#,
        );
        let token = endpoint(transport.clone())
            .request_long_lived_token("short-lived")
            .await
            .unwrap();

        assert_eq!(token.access_token, "long-lived");
        assert_eq!(token.expires_in, Some(3599));

        let request = transport.last_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url.as_str(), "https://oauth2.googleapis.com/token");
        assert_eq!(request.form_param("grant_type"), Some("refresh_token"));
        assert_eq!(request.form_param("refresh_token"), Some("short-lived"));
        assert_eq!(request.form_param("client_id"), Some("client-123"));
        assert_eq!(request.form_param("client_secret"), Some("client-secret"));
    }

    #[tokio::test]
    async fn test_token_error_body_is_surfaced() {
        let transport = CannedTransport::new(
            400,
            r#"{"error":"invalid_grant","error_description":"Bad Request"}"#,
        );
        let err = endpoint(transport)
            .request_long_lived_token("short-lived")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::RemoteProtocol { status: 400, .. }));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn test_token_response_without_access_token_is_malformed() {
        let transport = CannedTransport::new(200, r#"{"token_type":"Bearer"}"#);
        let err = endpoint(transport)
            .request_long_lived_token("short-lived")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse { .. }));
    }

    #[test]
    fn test_invalid_endpoint_is_configuration_error() {
        let mut config = GoogleProviderConfig::new("client-123", "secret");
        config.endpoints.token = "not a url".to_string();

        let err = TokenEndpoint::new(&config, CannedTransport::new(200, "{}")).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }
}
