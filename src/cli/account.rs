//! Account and configuration commands.

use crate::config::AppConfig;

use super::{authenticated_client, CliError, Result};

pub async fn account() -> Result<()> {
    let (client, _config) = authenticated_client()?;
    let account = client.get_user_account().await?;

    println!("Account Information:");
    println!();
    println!("  Name: {}", or_na(&account.name));
    println!("  Email: {}", account.email);
    println!(
        "  Email Verified: {}",
        if account.email_verified { "Yes" } else { "No" }
    );
    let locale = account
        .user_locale
        .map(|l| l.to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "N/A".to_string());
    println!("  Locale: {locale}");
    println!("  User UUID: {}", account.user_uuid);
    println!("  Public UUID: {}", account.public_user_uuid);
    Ok(())
}

pub fn config_cmd(key: Option<String>, value: Option<String>) -> Result<()> {
    let mut config = AppConfig::load();

    let Some(key) = key else {
        println!("Configuration:");
        println!();
        println!("  servings: {}", or_unset_num(config.defaults.servings));
        println!(
            "  defaultList: {}",
            or_unset(config.defaults.default_list.as_deref())
        );
        println!("  locale: {}", or_unset(config.defaults.locale.as_deref()));
        println!();
        println!("Config file: {}", AppConfig::config_path().display());
        return Ok(());
    };

    let Some(value) = value else {
        match key.as_str() {
            "servings" => println!("servings: {}", or_unset_num(config.defaults.servings)),
            "defaultList" => println!(
                "defaultList: {}",
                or_unset(config.defaults.default_list.as_deref())
            ),
            "locale" => println!("locale: {}", or_unset(config.defaults.locale.as_deref())),
            _ => {
                return Err(CliError::Usage(format!(
                    "Unknown config key: {key}. Valid keys: servings, defaultList, locale"
                )))
            }
        }
        return Ok(());
    };

    match key.as_str() {
        "servings" => {
            let servings: u32 = value
                .parse()
                .ok()
                .filter(|&n| n >= 1)
                .ok_or_else(|| CliError::Usage("servings must be a positive number".to_string()))?;
            config.defaults.servings = Some(servings);
        }
        "defaultList" => config.defaults.default_list = Some(value.clone()),
        "locale" => config.defaults.locale = Some(value.clone()),
        _ => {
            return Err(CliError::Usage(format!(
                "Unknown config key: {key}. Valid keys: servings, defaultList, locale"
            )))
        }
    }

    config.save()?;
    println!("Set {key} = {value}");
    Ok(())
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

fn or_unset(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or("(not set)")
        .to_string()
}

fn or_unset_num(value: Option<u32>) -> String {
    value
        .map(|n| n.to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
