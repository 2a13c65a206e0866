//! Post-submission bookkeeping
//!
//! Only runs after a confirmed full-report delivery.

use crate::probe::LogStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const STATS_FILE: &str = "stats.json";

pub trait PostSubmit {
    fn increment_bugs_submitted(&mut self);
    fn purge_logs(&mut self);
}

/// Post-submit hooks shared with the blocking worker that runs them.
pub type SharedPostSubmit = Arc<Mutex<dyn PostSubmit + Send>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub bugs_submitted: u64,
}

impl Stats {
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)
    }
}

/// Counter in a local JSON file, log purge through the log store.
pub struct LocalPostSubmit {
    stats_path: Option<PathBuf>,
    log_store: Arc<dyn LogStore>,
}

impl LocalPostSubmit {
    pub fn new(stats_path: Option<PathBuf>, log_store: Arc<dyn LogStore>) -> Self {
        Self {
            stats_path,
            log_store,
        }
    }

    pub fn default_stats_path() -> Option<PathBuf> {
        crate::config::Config::data_dir().map(|dir| dir.join(STATS_FILE))
    }
}

impl PostSubmit for LocalPostSubmit {
    fn increment_bugs_submitted(&mut self) {
        let Some(path) = &self.stats_path else {
            tracing::warn!("no data directory; bug counter not updated");
            return;
        };
        let mut stats = Stats::load_from(path);
        stats.bugs_submitted += 1;
        match stats.save_to(path) {
            Ok(()) => tracing::debug!(total = stats.bugs_submitted, "bug counter updated"),
            Err(err) => tracing::warn!(path = %path.display(), "failed to save stats: {}", err),
        }
    }

    fn purge_logs(&mut self) {
        match self.log_store.cleanup() {
            Ok(cleared) => tracing::debug!(files = cleared, "purged application logs"),
            Err(err) => tracing::warn!("failed to purge application logs: {}", err),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::PostSubmit;

    #[derive(Debug, Default)]
    pub struct CountingPostSubmit {
        pub increments: u32,
        pub purges: u32,
    }

    impl PostSubmit for CountingPostSubmit {
        fn increment_bugs_submitted(&mut self) {
            self.increments += 1;
        }

        fn purge_logs(&mut self) {
            self.purges += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FileLogStore;
    use tempfile::TempDir;

    #[test]
    fn test_counter_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(STATS_FILE);
        let store: Arc<dyn LogStore> = Arc::new(FileLogStore::new(dir.path().join("logs")));

        LocalPostSubmit::new(Some(path.clone()), Arc::clone(&store)).increment_bugs_submitted();
        LocalPostSubmit::new(Some(path.clone()), store).increment_bugs_submitted();

        assert_eq!(Stats::load_from(&path).bugs_submitted, 2);
    }

    #[test]
    fn test_corrupt_stats_file_restarts_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STATS_FILE);
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Stats::load_from(&path), Stats::default());
    }

    #[test]
    fn test_purge_truncates_log_files() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "{\"time\": 1.0, \"level\": \"info\", \"message\": \"hi\"}\n").unwrap();
        let store: Arc<dyn LogStore> = Arc::new(FileLogStore::new(dir.path()));

        LocalPostSubmit::new(None, store).purge_logs();

        assert_eq!(fs::read_to_string(&log).unwrap(), "");
    }
}
