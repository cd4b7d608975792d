use anyhow::{Context, bail};

use gcal_mirror::storage::config::Config;
use gcal_mirror::sync::google_auth::GoogleAuthenticator;

pub async fn check_or_setup_auth(config: &Config, force: bool) -> anyhow::Result<GoogleAuthenticator> {
    let mut auth = GoogleAuthenticator::new(&config.google);

    if !auth.has_credentials() {
        println!("Configuration incomplete. Please edit the config file at:");
        println!("{}", Config::config_path().display());
        println!("\nYou need to set:");
        println!("  - google.client_id: Your Google OAuth2 client ID");
        println!("  - google.client_secret: Your Google OAuth2 client secret");
        println!("\nGet these from: https://console.cloud.google.com/apis/credentials");
        bail!("Missing Google OAuth credentials in config");
    }

    if !force && auth.get_valid_token().await.is_ok() {
        tracing::info!("Using cached Google Calendar token");
        return Ok(auth);
    }

    println!("No valid authentication found. Setting up Google Calendar access...\n");
    auth.print_auth_instructions();

    println!("Enter the authorization code: ");
    let mut code = String::new();
    std::io::stdin()
        .read_line(&mut code)
        .context("Failed to read authorization code")?;

    auth.exchange_code_for_token(code.trim())
        .await
        .context("Failed to exchange authorization code")?;
    println!("\nAuthentication successful!\n");

    Ok(auth)
}
