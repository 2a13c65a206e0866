//! Diagnostic probes
//!
//! Each probe produces one named text artifact for the bundle. Probes are
//! read-only with respect to system state (the display probe's temporary EDID
//! dump is the one exception, and it deletes it before returning). A probe
//! that fails contributes nothing; it never aborts collection.

mod applogs;
mod command;
mod hdmi;
mod wifi;

pub use applogs::{AppLogFormat, AppLogProbe, FileLogStore, LogEntry, LogStore};
pub use command::{shell_quote, CommandProbe, FileProbe};
pub use hdmi::HdmiProbe;
pub use wifi::{redact_wifi_cache, WifiProbe, REDACTED_KEY};

use crate::config::ProbePaths;
use crate::error::ProbeError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A single diagnostic collector.
pub trait DiagnosticProbe: Send + Sync {
    /// Fixed, non-empty file name of the artifact inside the bundle.
    fn name(&self) -> &str;

    fn collect(&self) -> Result<String, ProbeError>;
}

/// Output of one probe. Only files with non-empty contents are staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticFile {
    pub name: String,
    pub contents: String,
}

impl DiagnosticFile {
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Run a probe, absorbing any failure into an empty artifact.
pub fn run_probe(probe: &dyn DiagnosticProbe) -> DiagnosticFile {
    let contents = match probe.collect() {
        Ok(contents) => contents,
        Err(err) => {
            tracing::debug!(probe = probe.name(), "probe yielded nothing: {}", err);
            String::new()
        }
    };
    DiagnosticFile {
        name: probe.name().to_string(),
        contents,
    }
}

/// Everything the fixed catalog needs from its surroundings.
#[derive(Clone)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub paths: ProbePaths,
    /// Directory for temporary probe files (the scratch space)
    pub work_dir: PathBuf,
    pub username: String,
    pub log_store: Arc<dyn LogStore>,
}

/// Fixed probe catalog, in collection order.
pub fn default_catalog(settings: &ProbeSettings) -> Vec<Box<dyn DiagnosticProbe>> {
    let timeout = settings.timeout;
    let paths = &settings.paths;
    let version_file = shell_quote(&paths.version_file.to_string_lossy());
    let syslog = paths.syslog.to_string_lossy().into_owned();

    vec![
        Box::new(CommandProbe::shell(
            "kanux_version.txt",
            format!(
                "ls -l {file} | awk '{{ print $6 \" \" $7 \" \" $8 }}' && cat {file}",
                file = version_file
            ),
            timeout,
        )),
        Box::new(CommandProbe::new("process.txt", &["ps", "aux"], timeout)),
        Box::new(CommandProbe::shell(
            "packages.txt",
            "dpkg-query -l | awk '{ print $2 \"-\" $3 }'",
            timeout,
        )),
        Box::new(CommandProbe::new("dmesg.txt", &["dmesg"], timeout)),
        Box::new(CommandProbe::new(
            "syslog.txt",
            &["tail", "-v", "-n", "100", syslog.as_str()],
            timeout,
        )),
        Box::new(FileProbe::new("cmdline.txt", &paths.boot_cmdline)),
        Box::new(FileProbe::new("config.txt", &paths.boot_config)),
        Box::new(WifiProbe {
            username: settings.username.clone(),
            cache_path: paths.wifi_cache.clone(),
            interface: paths.wireless_interface.clone(),
            log_path: paths.wifi_log.clone(),
            timeout,
        }),
        Box::new(CommandProbe::new("ifconfig.txt", &["ifconfig"], timeout)),
        Box::new(CommandProbe::shell(
            "usbdevices.txt",
            "lsusb && lsusb -t",
            timeout,
        )),
        Box::new(AppLogProbe::new(
            "app-logs.txt",
            AppLogFormat::Raw,
            Arc::clone(&settings.log_store),
        )),
        Box::new(AppLogProbe::new(
            "app-logs-json.txt",
            AppLogFormat::Json,
            Arc::clone(&settings.log_store),
        )),
        Box::new(HdmiProbe {
            edid_path: settings.work_dir.join("edid.dat"),
            timeout,
        }),
    ]
}
