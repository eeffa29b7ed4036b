//! Authentication commands: login, logout, status.

use std::io::{self, Write};

use chrono::{DateTime, Utc};

use crate::api::{BringClient, TokenAuth, UserAccount};
use crate::auth::{self, BrowserAuthConfig, Credential, CredentialAssembler};
use crate::config::{AppConfig, StoredCredential};

use super::{output, CliError, Result};

pub async fn login(browser: bool, token: Option<String>) -> Result<()> {
    if browser {
        browser_login().await
    } else {
        token_login(token).await
    }
}

/// Drive the browser-assisted login pipeline, validate the captured
/// credential against the account endpoint, and persist it.
async fn browser_login() -> Result<()> {
    let assembler = CredentialAssembler::new(BrowserAuthConfig::default());
    let credential = assembler.acquire().await?;

    println!("Validating token...");
    let client = client_for(&credential)?;
    let account = client.get_user_account().await?;

    persist(&credential, &account)
}

async fn token_login(token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => {
            println!();
            println!("To login, you need to extract your access token from the Bring! web app.");
            println!();
            println!("Steps:");
            println!("  1. Open {} in your browser", auth::APP_URL);
            println!("  2. Log in with your credentials");
            println!("  3. Open DevTools (F12) -> Application tab -> Local Storage");
            println!("  4. Find the \"accessToken\" key and copy its value");
            println!();
            println!("Or use `bringr login --browser` for automatic browser-based login.");
            println!();
            prompt("Paste your access token: ")?
        }
    };

    if token.is_empty() {
        return Err(CliError::Usage("No token provided".to_string()));
    }

    let claims = auth::decode_jwt(&token)?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| CliError::Usage("Token missing user identifier (sub claim)".to_string()))?
        .to_string();
    if auth::is_expired(&claims, Utc::now().timestamp()) {
        return Err(CliError::Usage(
            "Token has expired. Please get a fresh token from the web app.".to_string(),
        ));
    }

    println!();
    println!("Validating token...");
    let credential = Credential {
        access_token: token,
        user_id,
        public_user_id: None,
        display_name: None,
        email: claims.email,
    };
    let client = client_for(&credential)?;
    let account = client.get_user_account().await?;

    persist(&credential, &account)
}

pub fn logout() -> Result<()> {
    if !AppConfig::load().is_logged_in() {
        println!("Not logged in");
        return Ok(());
    }
    AppConfig::clear()?;
    println!("Logged out successfully");
    Ok(())
}

pub fn status() -> Result<()> {
    let config = AppConfig::load();
    if !config.is_logged_in() {
        println!("Not logged in");
        println!();
        println!("Run `bringr login` to authenticate");
        return Ok(());
    }

    println!("Logged in");
    if !config.auth.user_name.is_empty() {
        println!("  Name: {}", config.auth.user_name);
    }
    if !config.auth.email.is_empty() {
        println!("  Email: {}", config.auth.email);
    }
    println!("  Config: {}", AppConfig::config_path().display());

    if let Ok(claims) = auth::decode_jwt(&config.auth.access_token) {
        if let Some(exp) = claims.expiry.filter(|&e| e > 0) {
            let now = Utc::now().timestamp();
            if auth::is_expired(&claims, now) {
                println!();
                output::warning("  Token has expired! Run `bringr login` to refresh.");
            } else if let Some(when) = DateTime::from_timestamp(exp, 0) {
                let days_left = (exp - now + 86399) / 86400;
                println!("  Token expires: {} ({} days)", when.format("%Y-%m-%d"), days_left);
            }
        }
    }
    Ok(())
}

fn client_for(credential: &Credential) -> Result<BringClient> {
    Ok(BringClient::from_token(TokenAuth {
        access_token: credential.access_token.clone(),
        user_uuid: credential.user_id.clone(),
        public_user_uuid: credential.public_user_id.clone(),
    })?)
}

/// Write the validated credential to the config file, preferring the
/// account endpoint's identity fields over what the browser yielded.
fn persist(credential: &Credential, account: &UserAccount) -> Result<()> {
    let mut config = AppConfig::load();
    config.auth = StoredCredential {
        access_token: credential.access_token.clone(),
        user_uuid: prefer(&account.user_uuid, Some(credential.user_id.clone())),
        public_user_uuid: prefer(
            &account.public_user_uuid,
            credential.public_user_id.clone(),
        ),
        user_name: prefer(&account.name, credential.display_name.clone()),
        email: prefer(&account.email, credential.email.clone()),
    };
    config.save()?;

    let display = if config.auth.user_name.is_empty() {
        config.auth.email.clone()
    } else {
        config.auth.user_name.clone()
    };
    println!();
    output::success(&format!("Logged in as {display}"));
    println!("Config saved to {}", AppConfig::config_path().display());
    Ok(())
}

fn prefer(primary: &str, fallback: Option<String>) -> String {
    if primary.is_empty() {
        fallback.unwrap_or_default()
    } else {
        primary.to_string()
    }
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
