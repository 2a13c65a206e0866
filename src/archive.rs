//! Scratch space and diagnostic bundle
//!
//! Probe output is staged as flat files in the scratch directory and packed
//! into a single gzip-compressed tar. The builder never removes the scratch
//! directory: that is done once per cycle by whoever owns the cycle.

use crate::error::ArchiveError;
use crate::probe::{run_probe, DiagnosticProbe};
use crate::util::{command_from_argv, command_label, run_command_with_timeout};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

pub const SCREENSHOT_NAME: &str = "screenshot.png";
pub const ARCHIVE_NAME: &str = "bug_report.tar.gz";

/// Transient staging directory for one collection cycle.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl ScratchSpace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn ensure(&self) -> Result<(), ArchiveError> {
        fs::create_dir_all(&self.root).map_err(|source| ArchiveError::Scratch {
            path: self.root.clone(),
            source,
        })
    }

    /// Remove the directory and everything in it. Missing is fine.
    pub fn cleanup(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.root) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }

    pub fn screenshot_path(&self) -> PathBuf {
        self.root.join(SCREENSHOT_NAME)
    }

    pub fn has_screenshot(&self) -> bool {
        self.screenshot_path().is_file()
    }

    /// Run a capture tool; `{path}` in `argv` is replaced with the screenshot path.
    pub fn capture_screenshot(&self, argv: &[String], timeout: Duration) -> Result<(), ArchiveError> {
        self.ensure()?;
        let target = self.screenshot_path().to_string_lossy().into_owned();
        let argv: Vec<String> = argv.iter().map(|arg| arg.replace("{path}", &target)).collect();
        let label = command_label(&argv);
        let mut command = command_from_argv(&argv)
            .ok_or_else(|| ArchiveError::Archiver("empty screenshot command".to_string()))?;

        let result = run_command_with_timeout(&mut command, timeout)
            .map_err(|e| ArchiveError::Archiver(format!("{}: {}", label, e)))?;
        if !result.success() {
            tracing::warn!(command = %label, "screenshot capture failed: {}", result.stderr.trim());
        }
        Ok(())
    }

    /// Copy an existing image in as the screenshot. Non-files are ignored.
    pub fn copy_screenshot(&self, source: &Path) -> Result<bool, ArchiveError> {
        self.ensure()?;
        if !source.is_file() {
            tracing::warn!("screenshot source {} is not a file", source.display());
            return Ok(false);
        }
        fs::copy(source, self.screenshot_path()).map_err(|source| ArchiveError::Scratch {
            path: self.screenshot_path(),
            source,
        })?;
        Ok(true)
    }

    pub fn delete_screenshot(&self) {
        let _ = fs::remove_file(self.screenshot_path());
    }
}

/// Removes the scratch directory when dropped, so every exit path of a
/// cycle cleans up exactly once.
#[derive(Debug)]
pub struct ScratchGuard {
    scratch: ScratchSpace,
}

impl ScratchGuard {
    pub fn new(scratch: ScratchSpace) -> Self {
        Self { scratch }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        match self.scratch.cleanup() {
            Ok(()) => tracing::debug!("removed scratch space {}", self.scratch.root().display()),
            Err(err) => tracing::warn!(
                "failed to remove scratch space {}: {}",
                self.scratch.root().display(),
                err
            ),
        }
    }
}

/// Packs staged files into a compressed archive.
pub trait Archiver: Send + Sync {
    /// Create `output` from `members`, named relative to `base_dir`.
    fn create(&self, base_dir: &Path, members: &[String], output: &Path) -> Result<(), ArchiveError>;
}

/// The system `tar`, invoked with an explicit base directory (`-C`) so
/// entries carry no directory prefix and the process working directory is
/// left alone.
#[derive(Debug, Clone)]
pub struct SystemTar {
    pub program: String,
    pub timeout: Duration,
}

impl SystemTar {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "tar".to_string(),
            timeout,
        }
    }
}

impl Archiver for SystemTar {
    fn create(&self, base_dir: &Path, members: &[String], output: &Path) -> Result<(), ArchiveError> {
        let mut command = Command::new(&self.program);
        command.arg("-czf").arg(output).arg("-C").arg(base_dir);
        if members.is_empty() {
            // tar refuses to write an empty archive from an empty member list
            command.arg("-T").arg("/dev/null");
        } else {
            command.arg("--").args(members);
        }

        let result = run_command_with_timeout(&mut command, self.timeout)
            .map_err(ArchiveError::Archiver)?;
        if result.timed_out {
            return Err(ArchiveError::ArchiverTimedOut(self.timeout));
        }
        if !result.success() {
            return Err(ArchiveError::Archiver(format!(
                "{} exited with {:?}: {}",
                self.program,
                result.exit_code(),
                result.stderr.trim()
            )));
        }
        Ok(())
    }
}

/// A built bundle on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub path: PathBuf,
    /// Entry names in staging order (probe catalog order, screenshot last)
    pub members: Vec<String>,
}

impl Archive {
    pub fn file_name(&self) -> &str {
        ARCHIVE_NAME
    }

    pub fn bytes(&self) -> Result<Vec<u8>, ArchiveError> {
        fs::read(&self.path).map_err(|source| ArchiveError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// Runs the probe catalog and packs the non-empty results.
pub struct ArchiveBuilder {
    scratch: ScratchSpace,
    probes: Vec<Box<dyn DiagnosticProbe>>,
    archiver: Box<dyn Archiver>,
}

impl ArchiveBuilder {
    pub fn new(
        scratch: ScratchSpace,
        probes: Vec<Box<dyn DiagnosticProbe>>,
        archiver: Box<dyn Archiver>,
    ) -> Self {
        Self {
            scratch,
            probes,
            archiver,
        }
    }

    pub fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    /// Stage every non-empty probe result and the screenshot, then pack them.
    ///
    /// A bundle with zero members is valid.
    pub fn build(&self) -> Result<Archive, ArchiveError> {
        self.scratch.ensure()?;
        let root = self.scratch.root();

        let mut members = Vec::new();
        for probe in &self.probes {
            let file = run_probe(probe.as_ref());
            if file.is_empty() {
                continue;
            }
            let path = root.join(&file.name);
            fs::write(&path, file.contents.as_bytes())
                .map_err(|source| ArchiveError::Scratch { path, source })?;
            members.push(file.name);
        }

        if self.scratch.has_screenshot() {
            members.push(SCREENSHOT_NAME.to_string());
        }

        let output = root.join(ARCHIVE_NAME);
        tracing::info!(members = members.len(), "packing diagnostic bundle");
        self.archiver.create(root, &members, &output)?;

        Ok(Archive {
            path: output,
            members,
        })
    }
}
