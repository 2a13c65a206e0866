//! Configuration management for diagdrop
//!
//! Stores settings in ~/.config/diagdrop/config.json

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Hosted form used by the fallback submission path.
pub const DEFAULT_FORM_URL: &str =
    "https://docs.google.com/a/kano.me/forms/d/1FH-6IKeuc9t6pp4lPhncG1yz29lYuLGpFv88RRaUBgU/formResponse";

const SCRATCH_DIR_NAME: &str = ".diagdrop-feedback";
const LOG_DIR_NAME: &str = ".diagdrop-logs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the feedback intake API (`<api_url>/feedback` receives reports)
    pub api_url: Option<String>,
    pub form_url: String,
    /// Override for the scratch directory (defaults to ~/.diagdrop-feedback/)
    pub scratch_dir: Option<PathBuf>,
    /// Application log store (defaults to ~/.diagdrop-logs/)
    pub log_dir: Option<PathBuf>,
    pub command_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub remedy_timeout_secs: u64,
    /// host:port used for the reachability check
    pub connectivity_target: String,
    pub connect_timeout_secs: u64,
    /// Interactive tool launched when the network is down
    pub network_remedy: Option<Vec<String>>,
    /// Interactive tool launched when no account session exists
    pub login_remedy: Option<Vec<String>>,
    /// Screenshot tool; `{path}` is replaced with the destination file
    pub screenshot_command: Option<Vec<String>>,
    pub account: AccountProfile,
    pub probes: ProbePaths,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountProfile {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// System locations read by the probe catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbePaths {
    pub version_file: PathBuf,
    pub syslog: PathBuf,
    pub boot_cmdline: PathBuf,
    pub boot_config: PathBuf,
    pub wifi_cache: PathBuf,
    pub wifi_log: PathBuf,
    pub wireless_interface: String,
}

impl Default for ProbePaths {
    fn default() -> Self {
        Self {
            version_file: PathBuf::from("/etc/kanux_version"),
            syslog: PathBuf::from("/var/log/messages"),
            boot_cmdline: PathBuf::from("/boot/cmdline.txt"),
            boot_config: PathBuf::from("/boot/config.txt"),
            wifi_cache: PathBuf::from("/etc/kwifiprompt-cache.conf"),
            wifi_log: PathBuf::from("/var/log/kano_wpa.log"),
            wireless_interface: "wlan0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            form_url: DEFAULT_FORM_URL.to_string(),
            scratch_dir: None,
            log_dir: None,
            command_timeout_secs: 10,
            request_timeout_secs: 60,
            remedy_timeout_secs: 600,
            connectivity_target: "1.1.1.1:443".to_string(),
            connect_timeout_secs: 5,
            network_remedy: None,
            login_remedy: None,
            screenshot_command: None,
            account: AccountProfile::default(),
            probes: ProbePaths::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("diagdrop"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str(&content) {
                Ok(config) => return config,
                Err(err) => {
                    preserve_corrupt_config(path, &content);
                    tracing::warn!(
                        "Config file was corrupted ({}). A backup was saved and defaults were loaded.",
                        err
                    );
                }
            }
        }
        Self::default()
    }

    /// Save config to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoDirectory("config"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let dir = path.parent().ok_or(ConfigError::NoDirectory("config"))?;
        fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(dir, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("Failed to set config directory permissions: {}", e);
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        write_config_atomic(path, &content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Intake API base URL (environment takes precedence)
    pub fn api_url(&self) -> Option<String> {
        if let Ok(url) = std::env::var("DIAGDROP_API_URL") {
            if !url.is_empty() {
                return Some(url);
            }
        }
        self.api_url.clone()
    }

    /// Scratch directory for one collection cycle
    pub fn scratch_dir(&self) -> Option<PathBuf> {
        self.scratch_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(SCRATCH_DIR_NAME)))
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(LOG_DIR_NAME)))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn remedy_timeout(&self) -> Duration {
        Duration::from_secs(self.remedy_timeout_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    /// Directory for state that outlives a cycle (stats, lock file)
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("diagdrop"))
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/diagdrop/config.json".to_string())
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

fn write_config_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    use std::fs::OpenOptions;

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
            tracing::warn!("Failed to set temp config file permissions: {}", e);
        }
    }

    file.write_all(content.as_bytes())?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}
