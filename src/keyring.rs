//! Keychain storage for the account session token
//!
//! All credentials live in a single keychain entry, stored as JSON, so the
//! platform prompts at most once per session.

use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

const KEYRING_SERVICE: &str = "diagdrop-credentials";
const KEYRING_USERNAME: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_token: Option<String>,
}

type KeyringResult<T> = Result<T, String>;

static CREDENTIALS_CACHE: OnceLock<Mutex<Option<StoredCredentials>>> = OnceLock::new();
static KEYRING_ERROR_WARNED: AtomicBool = AtomicBool::new(false);

fn credentials_cache() -> &'static Mutex<Option<StoredCredentials>> {
    CREDENTIALS_CACHE.get_or_init(|| Mutex::new(None))
}

fn keyring_disabled() -> bool {
    if cfg!(test) {
        return true;
    }
    matches!(
        std::env::var("DIAGDROP_DISABLE_KEYRING")
            .unwrap_or_default()
            .to_lowercase()
            .as_str(),
        "1" | "true" | "yes"
    )
}

fn keyring_entry() -> Result<Entry, keyring::Error> {
    Entry::new(KEYRING_SERVICE, KEYRING_USERNAME)
}

/// Warn about keychain errors only once per session
pub fn warn_keychain_error_once(context: &str, err: &str) {
    if KEYRING_ERROR_WARNED.swap(true, Ordering::Relaxed) {
        return;
    }
    tracing::warn!("Couldn't access system keychain for {}: {}", context, err);
    tracing::warn!("Set DIAGDROP_TOKEN to bypass the keychain.");
}

#[cfg(not(test))]
fn disabled_store_contents() -> StoredCredentials {
    StoredCredentials::default()
}

#[cfg(test)]
fn disabled_store_contents() -> StoredCredentials {
    StoredCredentials {
        api_token: testing::stored_token(),
    }
}

fn read_credentials_uncached() -> KeyringResult<StoredCredentials> {
    if keyring_disabled() {
        return Ok(disabled_store_contents());
    }
    let entry = keyring_entry().map_err(|e| e.to_string())?;
    match entry.get_password() {
        Ok(json) => {
            serde_json::from_str(&json).map_err(|e| format!("Failed to parse credentials: {}", e))
        }
        Err(keyring::Error::NoEntry) => Ok(StoredCredentials::default()),
        Err(err) => Err(err.to_string()),
    }
}

fn write_credentials(creds: &StoredCredentials) -> Result<(), String> {
    if keyring_disabled() {
        return Err("system keychain is disabled".to_string());
    }
    let entry = keyring_entry().map_err(|e| e.to_string())?;
    let json = serde_json::to_string(creds).map_err(|e| e.to_string())?;
    entry.set_password(&json).map_err(|e| e.to_string())
}

fn read_credentials_cached() -> KeyringResult<StoredCredentials> {
    let mut guard = match credentials_cache().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(ref creds) = *guard {
        return Ok(creds.clone());
    }

    let creds = read_credentials_uncached()?;
    *guard = Some(creds.clone());
    Ok(creds)
}

fn update_cache(creds: StoredCredentials) {
    let mut guard = match credentials_cache().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Some(creds);
}

// ============================================================================
// Public API
// ============================================================================

/// Drop the cached credentials so the next read goes to the keychain.
/// Needed after an external tool may have changed the entry.
pub fn invalidate_cache() {
    let mut guard = match credentials_cache().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = None;
}

/// Get the account token from the keychain
pub fn get_api_token() -> KeyringResult<Option<String>> {
    let creds = read_credentials_cached()?;
    Ok(creds.api_token)
}

/// Store the account token in the keychain
pub fn set_api_token(token: &str) -> Result<(), String> {
    let mut creds = read_credentials_cached().unwrap_or_default();
    creds.api_token = Some(token.to_string());
    write_credentials(&creds)?;
    update_cache(creds);
    Ok(())
}

/// Remove the account token from the keychain
pub fn clear_api_token() -> Result<(), String> {
    let mut creds = read_credentials_cached().unwrap_or_default();
    creds.api_token = None;
    write_credentials(&creds)?;
    update_cache(creds);
    Ok(())
}

/// Human-readable name of the credential store, for messages
pub fn credentials_store_label() -> &'static str {
    if cfg!(target_os = "macos") {
        "macOS Keychain"
    } else if cfg!(target_os = "windows") {
        "Windows Credential Manager"
    } else {
        "system keyring"
    }
}
