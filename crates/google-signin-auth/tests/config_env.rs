//! Environment overrides on top of a configuration file.

use std::{env, fs};

use google_signin_auth::GoogleProviderConfig;

#[test]
fn test_env_overrides_keep_values_verbatim() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("gsignin.toml");
    fs::write(
        &path,
        r#"
client_id = "from-file"
client_secret = "file-secret"
"#,
    )
    .expect("write toml");

    unsafe {
        env::set_var("GSIGNIN__CLIENT_ID", "12345678901234567890");
        env::set_var("GSIGNIN__CLIENT_SECRET", "000123");
        env::set_var("GSIGNIN__ENABLE_PROFILE_CREATION", "true");
        env::set_var("GSIGNIN__AUTHENTICATE_ROLES", "Acme.Site:User,Acme.Site:Editor");
    }
    let loaded = GoogleProviderConfig::load(Some(&path));
    unsafe {
        env::remove_var("GSIGNIN__CLIENT_ID");
        env::remove_var("GSIGNIN__CLIENT_SECRET");
        env::remove_var("GSIGNIN__ENABLE_PROFILE_CREATION");
        env::remove_var("GSIGNIN__AUTHENTICATE_ROLES");
    }

    let config = loaded.expect("should load config with env overrides");
    assert_eq!(config.client_id, "12345678901234567890");
    assert_eq!(config.client_secret, "000123");
    assert_eq!(config.effective_app_secret(), "000123");
    assert!(config.enable_profile_creation);
    assert_eq!(
        config.authenticate_roles,
        vec!["Acme.Site:User", "Acme.Site:Editor"]
    );
}
