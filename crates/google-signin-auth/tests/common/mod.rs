//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use google_signin_auth::prelude::*;
use google_signin_auth::{HttpRequest, HttpResponse, TransportError};

pub const CLIENT_ID: &str = "client-123";
pub const CLIENT_SECRET: &str = "client-secret";
pub const APP_SECRET: &str = "app-secret";
pub const PROVIDER_NAME: &str = "google";
pub const DEFAULT_ROLE: &str = "Acme.Site:User";

pub const TOKEN_INFO_PATH: &str = "/oauth2/v3/tokeninfo";
pub const TOKEN_PATH: &str = "/token";
pub const USER_INFO_PATH: &str = "/userinfo/v2/me";

/// Answers requests by URL path and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sets the response for a path, replacing any earlier one.
    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), HttpResponse::new(status, body));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self
            .routes
            .lock()
            .unwrap()
            .get(request.url.path())
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, "no route"));
        self.requests.lock().unwrap().push(request);
        Ok(response)
    }
}

pub fn config() -> GoogleProviderConfig {
    GoogleProviderConfig::new(CLIENT_ID, CLIENT_SECRET)
        .with_provider_name(PROVIDER_NAME)
        .with_app_secret(APP_SECRET)
        .with_authenticate_role(DEFAULT_ROLE)
}

pub fn roles() -> Arc<StaticRoleResolver> {
    Arc::new(StaticRoleResolver::from_identifiers([
        DEFAULT_ROLE,
        "Acme.Site:Editor",
    ]))
}

/// A provider wired to an in-memory store and a scripted transport.
pub struct Harness {
    pub provider: GoogleAuthenticationProvider,
    pub store: Arc<InMemoryStore>,
    pub transport: Arc<ScriptedTransport>,
}

impl Harness {
    pub fn new(config: GoogleProviderConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let transport = ScriptedTransport::new();
        let context = AuthContext::in_memory(config, store.clone(), roles(), transport.clone());
        let provider = GoogleAuthenticationProvider::new(context).unwrap();
        Self {
            provider,
            store,
            transport,
        }
    }

    /// Scripts a successful introspection for `sub` and a token exchange
    /// returning `long_lived`.
    pub fn google_accepts(&self, sub: &str, long_lived: &str) {
        self.transport.respond(
            TOKEN_INFO_PATH,
            200,
            &format!(r#"{{"aud":"{CLIENT_ID}","sub":"{sub}","email":"ada@example.com"}}"#),
        );
        self.transport.respond(
            TOKEN_PATH,
            200,
            &format!(r#"{{"access_token":"{long_lived}","token_type":"Bearer","expires_in":3599}}"#),
        );
    }

    pub async fn login(&self, access_token: &str) -> (AuthResult<()>, ClientToken) {
        let mut token = ClientToken::new(Credentials::new(access_token).with_id_token("id-token"));
        let result = self.provider.authenticate(&mut token).await;
        (result, token)
    }
}
