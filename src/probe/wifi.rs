use super::command::run_for_stdout;
use super::DiagnosticProbe;
use crate::error::ProbeError;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Literal that replaces every stored encryption key.
pub const REDACTED_KEY: &str = "obfuscated";

const WIFI_LOG_LINES: &str = "300";

/// Wi-Fi bundle: account name, redacted credential cache, interface status
/// and the tail of the connection log.
#[derive(Debug, Clone)]
pub struct WifiProbe {
    pub username: String,
    pub cache_path: PathBuf,
    pub interface: String,
    pub log_path: PathBuf,
    pub timeout: Duration,
}

impl DiagnosticProbe for WifiProbe {
    fn name(&self) -> &str {
        "wifi-info.txt"
    }

    fn collect(&self) -> Result<String, ProbeError> {
        let cache = fs::read_to_string(&self.cache_path)
            .map(|raw| redact_wifi_cache(&raw))
            .unwrap_or_default();
        let iface = run_for_stdout(
            &["iwconfig".to_string(), self.interface.clone()],
            self.timeout,
        )
        .unwrap_or_default();
        let wpa_log = run_for_stdout(
            &[
                "tail".to_string(),
                "-n".to_string(),
                WIFI_LOG_LINES.to_string(),
                self.log_path.to_string_lossy().into_owned(),
            ],
            self.timeout,
        )
        .unwrap_or_default();

        Ok(format!(
            "Account username: {}\n\n**wifi_cache**\n {}\n\n**wlaniface**\n {}\n\n**wpalog**\n {}\n\n",
            self.username, cache, iface, wpa_log
        ))
    }
}

fn enckey_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""enckey"\s*:.*"#).expect("enckey pattern is a valid regex")
    })
}

/// Replace everything from an `"enckey":` field to the end of its line with
/// the redaction literal.
pub fn redact_wifi_cache(raw: &str) -> String {
    let replacement = format!("\"enckey\": \"{}\"", REDACTED_KEY);
    enckey_pattern()
        .replace_all(raw, regex::NoExpand(&replacement))
        .into_owned()
}
