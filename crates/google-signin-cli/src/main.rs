mod cli;
mod commands;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use google_signin_auth::GoogleProviderConfig;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    match &cli.command {
        Commands::Introspect(args) => {
            let config = load_config(&cli)?;
            commands::introspect::run(&config, args).await?;
        }
        Commands::Login(args) => {
            let config = load_config(&cli)?;
            commands::login::run(config, args).await?;
        }
        Commands::Proof(args) => match &args.app_secret {
            Some(secret) => commands::proof::run(secret, args),
            None => {
                let config = load_config(&cli)?;
                commands::proof::run(config.effective_app_secret(), args);
            }
        },
        Commands::Config => {
            let config = load_config(&cli)?;
            commands::config::show(&config, cli.config.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<GoogleProviderConfig> {
    GoogleProviderConfig::load(cli.config.as_deref()).context("Failed to load configuration")
}
