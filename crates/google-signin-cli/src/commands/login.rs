use std::sync::Arc;

use anyhow::{Context, Result};
use google_signin_auth::prelude::*;
use serde_json::json;

use crate::cli::TokenArgs;
use crate::output::{print_json, print_success, print_warning};

/// Runs the provider against a throwaway in-memory store. Every configured
/// default role is treated as known.
pub async fn run(config: GoogleProviderConfig, args: &TokenArgs) -> Result<()> {
    let transport = Arc::new(
        ReqwestTransport::new(config.http.request_timeout).context("Failed to build HTTP client")?,
    );
    let roles = Arc::new(StaticRoleResolver::from_identifiers(
        config.authenticate_roles.clone(),
    ));
    let store = Arc::new(InMemoryStore::new());
    let provider =
        GoogleAuthenticationProvider::new(AuthContext::in_memory(config, store, roles, transport))?;

    let mut token = ClientToken::new(args.credentials());
    let result = provider.authenticate(&mut token).await;

    match token.status() {
        AuthenticationStatus::AuthenticationSuccessful => {
            print_success(&format!("Authenticated with provider {}", provider.name()));
        }
        status => print_warning(&format!("Authentication status: {status}")),
    }

    print_json(&json!({
        "status": token.status(),
        "account": token.account(),
    }))?;

    result.context("Authentication did not complete")
}
