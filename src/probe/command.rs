use super::DiagnosticProbe;
use crate::error::ProbeError;
use crate::util::{command_from_argv, command_label, run_command_with_timeout};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Probe backed by an external command; its stdout is the artifact.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    name: String,
    argv: Vec<String>,
    timeout: Duration,
}

impl CommandProbe {
    pub fn new(name: impl Into<String>, argv: &[&str], timeout: Duration) -> Self {
        Self {
            name: name.into(),
            argv: argv.iter().map(|s| s.to_string()).collect(),
            timeout,
        }
    }

    /// Probe that runs a `sh -c` pipeline.
    pub fn shell(name: impl Into<String>, script: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            argv: vec!["sh".to_string(), "-c".to_string(), script.into()],
            timeout,
        }
    }
}

impl DiagnosticProbe for CommandProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Result<String, ProbeError> {
        run_for_stdout(&self.argv, self.timeout)
    }
}

/// Run `argv` and return its stdout, treating a non-zero exit, a timeout or
/// empty output as a probe failure.
pub(crate) fn run_for_stdout(argv: &[String], timeout: Duration) -> Result<String, ProbeError> {
    let label = command_label(argv);
    let mut command = command_from_argv(argv).ok_or_else(|| ProbeError::Spawn {
        command: label.clone(),
        reason: "empty command".to_string(),
    })?;

    let result = run_command_with_timeout(&mut command, timeout).map_err(|reason| {
        ProbeError::Spawn {
            command: label.clone(),
            reason,
        }
    })?;

    if result.timed_out {
        return Err(ProbeError::TimedOut {
            command: label,
            timeout,
        });
    }
    if !result.success() {
        return Err(ProbeError::ExitStatus {
            command: label,
            code: result.exit_code(),
        });
    }
    if result.stdout.is_empty() {
        return Err(ProbeError::Empty);
    }
    Ok(result.stdout)
}

/// Probe that copies a file verbatim.
#[derive(Debug, Clone)]
pub struct FileProbe {
    name: String,
    path: PathBuf,
}

impl FileProbe {
    pub fn new(name: impl Into<String>, path: &Path) -> Self {
        Self {
            name: name.into(),
            path: path.to_path_buf(),
        }
    }
}

impl DiagnosticProbe for FileProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Result<String, ProbeError> {
        let bytes = fs::read(&self.path).map_err(|source| ProbeError::Read {
            path: self.path.clone(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(ProbeError::Empty);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Quote a value for interpolation into a `sh -c` script.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
