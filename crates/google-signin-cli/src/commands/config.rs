use std::path::Path;

use anyhow::{Context, Result};
use google_signin_auth::GoogleProviderConfig;
use google_signin_auth::config::DEFAULT_CONFIG_FILE;

use crate::output::print_field;

const REDACTED: &str = "***";

pub fn show(config: &GoogleProviderConfig, path: Option<&Path>) -> Result<()> {
    let source = match path {
        Some(p) => p.display().to_string(),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => DEFAULT_CONFIG_FILE.to_string(),
        None => "(defaults and environment only)".to_string(),
    };
    print_field("Source", &source);
    println!();

    let rendered =
        toml::to_string_pretty(&redacted(config)).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

fn redacted(config: &GoogleProviderConfig) -> GoogleProviderConfig {
    let mut config = config.clone();
    if !config.client_secret.is_empty() {
        config.client_secret = REDACTED.to_string();
    }
    if let Some(secret) = config.app_secret.as_mut() {
        *secret = REDACTED.to_string();
    }
    config
}
