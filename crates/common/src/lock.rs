//! Run-once lock.
//!
//! With `use_lock` enabled the first run writes `api.lock` next to the
//! config and later runs see it and skip generation. Deleting the file
//! re-enables generation.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lock filename
pub const LOCK_FILENAME: &str = "api.lock";

/// Lock file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLock {
    pub pid: u32,
    /// Seconds since the Unix epoch
    pub started_at: u64,
}

impl RunLock {
    /// A lock for the current process.
    pub fn current() -> Self {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            pid: std::process::id(),
            started_at,
        }
    }

    /// Lock path inside `dir`.
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(LOCK_FILENAME)
    }

    /// Create the lock in `dir`.
    ///
    /// Returns `Ok(false)` without touching anything when the lock already
    /// exists.
    pub fn acquire(dir: &Path) -> Result<bool, String> {
        let path = Self::path(dir);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Lock already present.");
                return Ok(false);
            }
            Err(err) => return Err(format!("Failed to create {}: {err}", path.display())),
        };
        let contents = serde_json::to_string_pretty(&Self::current())
            .map_err(|err| format!("Failed to serialize lock: {err}"))?;
        file.write_all(contents.as_bytes())
            .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
        debug!(path = %path.display(), "Lock created.");
        Ok(true)
    }

    /// Read the lock in `dir`; `Ok(None)` when there is none.
    pub fn read(dir: &Path) -> Result<Option<Self>, String> {
        let path = Self::path(dir);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|err| format!("Failed to parse {}: {err}", path.display()))
    }

    /// Remove the lock in `dir` if present.
    pub fn release(dir: &Path) -> Result<(), String> {
        let path = Self::path(dir);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|err| format!("Failed to remove {}: {err}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_once() {
        let temp = TempDir::new().unwrap();
        assert!(RunLock::acquire(temp.path()).unwrap());
        assert!(!RunLock::acquire(temp.path()).unwrap());

        let lock = RunLock::read(temp.path()).unwrap().unwrap();
        assert_eq!(lock.pid, std::process::id());
    }

    #[test]
    fn test_release() {
        let temp = TempDir::new().unwrap();
        RunLock::release(temp.path()).unwrap();
        RunLock::acquire(temp.path()).unwrap();
        RunLock::release(temp.path()).unwrap();
        assert!(RunLock::read(temp.path()).unwrap().is_none());
        assert!(RunLock::acquire(temp.path()).unwrap());
    }

    #[test]
    fn test_foreign_lock_blocks() {
        let temp = TempDir::new().unwrap();
        fs::write(RunLock::path(temp.path()), "").unwrap();
        assert!(!RunLock::acquire(temp.path()).unwrap());
        assert!(RunLock::read(temp.path()).is_err());
    }
}
