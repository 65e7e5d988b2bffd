use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gsignin")]
#[command(about = "Verify Google sign-in tokens and exercise the authentication provider")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./gsignin.toml when present)
    #[arg(short, long, global = true, env = "GSIGNIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Introspect an access token and check its audience
    Introspect(TokenArgs),
    /// Run a full login against an in-memory account store
    Login(TokenArgs),
    /// Compute the appsecret_proof for an access token
    Proof(ProofArgs),
    /// Show the effective configuration (secrets redacted)
    Config,
}

#[derive(clap::Args)]
pub struct TokenArgs {
    /// Access token issued to the client by Google
    #[arg(short, long, env = "GSIGNIN_ACCESS_TOKEN")]
    pub access_token: String,
    /// OpenID Connect ID token
    #[arg(short, long)]
    pub id_token: Option<String>,
}

#[derive(clap::Args)]
pub struct ProofArgs {
    /// Access token to sign
    #[arg(short, long, env = "GSIGNIN_ACCESS_TOKEN")]
    pub access_token: String,
    /// App secret (defaults to the configured one)
    #[arg(long, env = "GSIGNIN_APP_SECRET")]
    pub app_secret: Option<String>,
}

impl TokenArgs {
    pub fn credentials(&self) -> google_signin_auth::Credentials {
        let credentials = google_signin_auth::Credentials::new(&self.access_token);
        match &self.id_token {
            Some(id_token) => credentials.with_id_token(id_token),
            None => credentials,
        }
    }
}
