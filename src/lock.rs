//! Cross-process lock around one feedback cycle
//!
//! The scratch directory is a single well-known path, so only one cycle may
//! be in flight per user.

use anyhow::Context;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

pub const LOCK_FILE: &str = "cycle.lock";

pub struct CycleLock {
    file: std::fs::File,
}

impl Drop for CycleLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl CycleLock {
    /// Take the lock in `dir`, failing immediately if another process holds it.
    pub fn acquire(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let lock_path = dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false) // Lock file content doesn't matter, just the lock
            .open(&lock_path)?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Self { file }),
            Err(err) if err.kind() == ErrorKind::WouldBlock => Err(anyhow::anyhow!(
                "Another feedback cycle is already running (lock: {})",
                lock_path.display()
            )),
            Err(err) => Err(err.into()),
        }
    }
}
