// crates/rbac-conformance-engine/src/lock.rs
// ============================================================================
// Module: Metadef Scenario Lock
// Description: Named cross-process exclusive lock over a lock file.
// Purpose: Serialize scenarios that share the global metadef namespace.
// Dependencies: fd-lock
// ============================================================================

//! ## Overview
//! Metadata-definition names live in one global namespace on the service,
//! so every scenario touching that family holds [`METADEF_LOCK_NAME`] for
//! its whole run. The lock is an advisory exclusive lock on
//! `<dir>/<name>.lock`; the guard releases it on drop, including during
//! unwinding. Acquisition never blocks: waiters poll [`ScenarioLock::try_acquire`].

use std::fs::File;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use fd_lock::RwLock;
use fd_lock::RwLockWriteGuard;
use thiserror::Error;

/// Lock name shared by every metadef scenario.
pub const METADEF_LOCK_NAME: &str = "metadef_namespaces";

/// Pause between attempts while another scenario holds the lock.
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Named lock file.
pub struct ScenarioLock {
    /// Advisory lock over the lock file.
    file: RwLock<File>,
    /// Lock file path.
    path: PathBuf,
}

impl ScenarioLock {
    /// Opens (creating if needed) the lock file for `name` under `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Open`] when the file cannot be opened.
    pub fn open(dir: &Path, name: &str) -> Result<Self, LockError> {
        let path = dir.join(format!("{name}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|err| LockError::Open(format!("{}: {err}", path.display())))?;
        Ok(Self {
            file: RwLock::new(file),
            path,
        })
    }

    /// Takes the exclusive lock only if nobody holds it.
    ///
    /// Callers on an async runtime retry on [`LockError::Busy`] after
    /// [`LOCK_POLL_INTERVAL`] instead of blocking a worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Busy`] when another holder has it and
    /// [`LockError::Acquire`] when locking itself fails.
    pub fn try_acquire(&mut self) -> Result<ScenarioLockGuard<'_>, LockError> {
        let path = self.path.display().to_string();
        self.file
            .try_write()
            .map(|guard| ScenarioLockGuard {
                _guard: guard,
            })
            .map_err(|err| {
                if err.kind() == ErrorKind::WouldBlock {
                    LockError::Busy(path)
                } else {
                    LockError::Acquire(format!("{path}: {err}"))
                }
            })
    }

    /// Lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Held exclusive lock; released on drop.
pub struct ScenarioLockGuard<'a> {
    /// Underlying file lock guard.
    _guard: RwLockWriteGuard<'a, File>,
}

/// Lock failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The lock file could not be opened.
    #[error("lock file unavailable: {0}")]
    Open(String),
    /// Locking failed.
    #[error("lock acquisition failed: {0}")]
    Acquire(String),
    /// The lock is held elsewhere.
    #[error("lock busy: {0}")]
    Busy(String),
}
