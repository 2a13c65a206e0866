use super::command::run_for_stdout;
use super::DiagnosticProbe;
use crate::error::ProbeError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Display diagnostics: current mode plus the parsed EDID block.
#[derive(Debug, Clone)]
pub struct HdmiProbe {
    /// Where the raw EDID is dumped; removed before `collect` returns.
    pub edid_path: PathBuf,
    pub timeout: Duration,
}

/// Deletes the EDID dump on every exit path.
struct TempFile<'a>(&'a Path);

impl Drop for TempFile<'_> {
    fn drop(&mut self) {
        let _ = fs::remove_file(self.0);
    }
}

impl HdmiProbe {
    fn parsed_edid(&self) -> Result<String, ProbeError> {
        let _cleanup = TempFile(&self.edid_path);
        let path = self.edid_path.to_string_lossy().into_owned();

        let dumped = run_for_stdout(
            &["tvservice".to_string(), "-d".to_string(), path.clone()],
            self.timeout,
        )?;
        let parsed = run_for_stdout(&["edidparser".to_string(), path], self.timeout)?;
        Ok(format!("{}{}", dumped, parsed))
    }
}

impl DiagnosticProbe for HdmiProbe {
    fn name(&self) -> &str {
        "hdmi-info.txt"
    }

    fn collect(&self) -> Result<String, ProbeError> {
        let mode = run_for_stdout(
            &["tvservice".to_string(), "-s".to_string()],
            self.timeout,
        )
        .unwrap_or_default();
        let edid = self.parsed_edid().unwrap_or_else(|err| {
            tracing::debug!("EDID unavailable: {}", err);
            String::new()
        });

        Ok(format!("Current resolution: {}\n\n{}", mode, edid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edid_dump_removed_even_when_tools_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let edid_path = dir.path().join("edid.dat");
        // Simulate a leftover dump from an interrupted run
        fs::write(&edid_path, b"\x00\xff").unwrap();

        let probe = HdmiProbe {
            edid_path: edid_path.clone(),
            timeout: Duration::from_secs(2),
        };
        let out = probe.collect().unwrap();

        assert!(out.starts_with("Current resolution: "));
        assert!(!edid_path.exists());
    }
}
