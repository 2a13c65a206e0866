//! Error types for the collection and submission pipeline
//!
//! Probe errors never leave the probe set: the archive builder maps them to
//! an omitted file. Everything else is surfaced to the caller as a value.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A single diagnostic probe could not produce output.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to start `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("`{command}` exited with status {code:?}")]
    ExitStatus { command: String, code: Option<i32> },

    #[error("`{command}` timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("no output")]
    Empty,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Building the diagnostic bundle failed.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("scratch space error at {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archiver failed: {0}")]
    Archiver(String),

    #[error("archiver timed out after {0:?}")]
    ArchiverTimedOut(Duration),

    #[error("failed to read archive {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bundle worker failed: {0}")]
    Worker(String),
}

/// The connectivity/login precondition did not hold after remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("no network connection")]
    Offline,

    #[error("not logged in")]
    NotLoggedIn,
}

/// Report delivery failed before or during transport.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("feedback endpoint is not configured (set api_url or DIAGDROP_API_URL)")]
    NotConfigured,

    #[error("not logged in")]
    MissingToken,

    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("server rejected report ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine {0} directory")]
    NoDirectory(&'static str),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}
