//! Account session: token storage and profile
//!
//! The session token is read from `DIAGDROP_TOKEN` first, then the system
//! keychain. Username and email live in the config profile.

use crate::config::Config;
use crate::keyring;
use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Input, Password};

pub const TOKEN_ENV: &str = "DIAGDROP_TOKEN";

/// Get the stored session token, or None if not logged in.
pub fn stored_token() -> Option<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.is_empty() {
            return Some(token);
        }
    }

    match keyring::get_api_token() {
        Ok(Some(token)) if !token.is_empty() => Some(token),
        Ok(_) => None,
        Err(err) => {
            keyring::warn_keychain_error_once("account token", &err);
            None
        }
    }
}

pub fn is_logged_in() -> bool {
    stored_token().is_some()
}

/// Username as shown in reports; empty when the profile has none.
pub fn username(config: &Config) -> String {
    config.account.username.clone().unwrap_or_default()
}

pub fn email(config: &Config) -> String {
    config.account.email.clone().unwrap_or_default()
}

/// Prompt for a session token and profile details, then persist them.
pub fn interactive_login(config: &mut Config) -> Result<()> {
    let theme = ColorfulTheme::default();

    let token: String = Password::with_theme(&theme)
        .with_prompt("Account token")
        .interact()
        .context("Failed to read token")?;
    let token = token.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("No token provided");
    }

    let username: String = Input::with_theme(&theme)
        .with_prompt("Username")
        .with_initial_text(config.account.username.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .context("Failed to read username")?;

    let email: String = Input::with_theme(&theme)
        .with_prompt("Email")
        .with_initial_text(config.account.email.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .context("Failed to read email")?;

    keyring::set_api_token(&token).map_err(|e| {
        anyhow::anyhow!(
            "Failed to store token in {}: {}. Set {} instead.",
            keyring::credentials_store_label(),
            e,
            TOKEN_ENV
        )
    })?;

    config.account.username = non_empty(username);
    config.account.email = non_empty(email);
    config.save().context("Failed to save account profile")?;

    tracing::info!("Logged in; token saved to {}", keyring::credentials_store_label());
    Ok(())
}

pub fn logout() -> Result<()> {
    keyring::clear_api_token().map_err(|e| anyhow::anyhow!("Failed to clear token: {}", e))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
