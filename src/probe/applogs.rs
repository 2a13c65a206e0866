//! Application log transcripts
//!
//! The log store itself belongs to the applications that write it; this side
//! only reads it (and truncates it after a report has been delivered).

use super::DiagnosticProbe;
use crate::error::ProbeError;
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// One structured log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unix timestamp in seconds
    pub time: f64,
    pub level: String,
    pub message: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Read-only view over persisted application logs, keyed by log file path.
pub trait LogStore: Send + Sync {
    fn read_logs(&self) -> BTreeMap<String, Vec<LogEntry>>;

    /// Drop retained entries. Returns the number of log files cleared.
    fn cleanup(&self) -> io::Result<usize>;
}

/// Log store backed by `*.log` files of JSON lines under one directory.
#[derive(Debug, Clone)]
pub struct FileLogStore {
    root: PathBuf,
}

impl FileLogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn log_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
            .collect();
        files.sort();
        files
    }
}

fn parse_log_file(path: &Path) -> Vec<LogEntry> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

impl LogStore for FileLogStore {
    fn read_logs(&self) -> BTreeMap<String, Vec<LogEntry>> {
        self.log_files()
            .into_iter()
            .map(|path| {
                let entries = parse_log_file(&path);
                (path.display().to_string(), entries)
            })
            .collect()
    }

    fn cleanup(&self) -> io::Result<usize> {
        let mut cleared = 0;
        for path in self.log_files() {
            OpenOptions::new().write(true).truncate(true).open(&path)?;
            cleared += 1;
        }
        Ok(cleared)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLogFormat {
    /// `LOGFILE:` headers followed by one formatted line per entry
    Raw,
    /// The whole store as sorted, indented JSON
    Json,
}

pub struct AppLogProbe {
    name: String,
    format: AppLogFormat,
    store: Arc<dyn LogStore>,
}

impl AppLogProbe {
    pub fn new(name: impl Into<String>, format: AppLogFormat, store: Arc<dyn LogStore>) -> Self {
        Self {
            name: name.into(),
            format,
            store,
        }
    }
}

impl DiagnosticProbe for AppLogProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Result<String, ProbeError> {
        let logs = self.store.read_logs();
        if logs.is_empty() {
            return Err(ProbeError::Empty);
        }
        let text = match self.format {
            AppLogFormat::Raw => raw_transcript(&logs),
            AppLogFormat::Json => json_transcript(&logs),
        };
        if text.is_empty() {
            return Err(ProbeError::Empty);
        }
        Ok(text)
    }
}

/// Application name for a log file: its file name up to the first dot.
fn app_name(path: &str) -> &str {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path);
    file_name.split('.').next().unwrap_or(file_name)
}

fn format_time(time: f64) -> String {
    let mut secs = time.floor() as i64;
    let mut micros = ((time - time.floor()) * 1e6).round() as u32;
    if micros >= 1_000_000 {
        secs += 1;
        micros = 0;
    }
    // Whole seconds carry no fractional part
    let pattern = if micros == 0 {
        "%Y-%m-%dT%H:%M:%S"
    } else {
        "%Y-%m-%dT%H:%M:%S%.6f"
    };
    match Local.timestamp_opt(secs, micros * 1_000).single() {
        Some(dt) => dt.format(pattern).to_string(),
        None => time.to_string(),
    }
}

pub(crate) fn raw_transcript(logs: &BTreeMap<String, Vec<LogEntry>>) -> String {
    let mut output = String::new();
    for (file, entries) in logs {
        let app = app_name(file);
        output.push_str(&format!("LOGFILE: {}\n", file));
        for entry in entries {
            output.push_str(&format!(
                "{} {} {}: {}\n",
                format_time(entry.time),
                app,
                entry.level,
                entry.message
            ));
        }
    }
    output
}

pub(crate) fn json_transcript(logs: &BTreeMap<String, Vec<LogEntry>>) -> String {
    // Going through `Value` sorts the keys of every entry, not just the top level
    let value = match serde_json::to_value(logs) {
        Ok(value) => value,
        Err(_) => return String::new(),
    };
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
