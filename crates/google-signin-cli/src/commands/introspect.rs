use std::sync::Arc;

use anyhow::{Context, Result, bail};
use google_signin_auth::{GoogleProviderConfig, Introspection, ReqwestTransport, TokenEndpoint};

use crate::cli::TokenArgs;
use crate::output::{print_json, print_success};

pub async fn run(config: &GoogleProviderConfig, args: &TokenArgs) -> Result<()> {
    let transport = Arc::new(
        ReqwestTransport::new(config.http.request_timeout).context("Failed to build HTTP client")?,
    );
    let endpoint = TokenEndpoint::new(config, transport)?;

    match endpoint
        .request_validated_token_information(&args.credentials())
        .await
        .context("Token introspection failed")?
    {
        Introspection::Validated(claims) => {
            print_success(&format!("Token is valid for client {}", endpoint.client_id()));
            let scopes = claims.scopes();
            if !scopes.is_empty() {
                print_success(&format!("Granted scopes: {}", scopes.join(", ")));
            }
            print_json(claims.claims())
        }
        Introspection::Rejected(reason) => bail!("Token rejected: {reason}"),
    }
}
