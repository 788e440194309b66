//! core::ops::lock
//!
//! Exclusive workspace lock for fizz operations.
//!
//! # Architecture
//!
//! The workspace lock ensures only one fizz process mutates a project at a
//! time. Two renames racing on the same specs directory would otherwise
//! interleave file renames and leave declarations pointing at each other's
//! names.
//!
//! The lock is advisory: editors and the packaging tool do not honor it.
//!
//! # Storage
//!
//! - `<root>/.fizz/lock` - Lock file with OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock must be held for the entire rename or delete
//! - Lock is automatically released on drop (RAII pattern)
//! - Lock acquisition is non-blocking (fails fast if locked)
//!
//! # Example
//!
//! ```ignore
//! use fizzkit::core::ops::lock::WorkspaceLock;
//! use fizzkit::core::paths::FizzPaths;
//! use std::path::PathBuf;
//!
//! let paths = FizzPaths::with_defaults(PathBuf::from("/proj"));
//! let lock = WorkspaceLock::acquire(&paths)?;
//!
//! // Perform operations while holding lock
//! // ...
//!
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::FizzPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("workspace is locked by another fizz process")]
    AlreadyLocked,

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive lock on a project workspace.
///
/// The lock is automatically released when this guard is dropped.
#[derive(Debug)]
pub struct WorkspaceLock {
    path: PathBuf,
    /// When this is Some, we hold the lock.
    file: Option<File>,
}

impl WorkspaceLock {
    /// Attempt to acquire the workspace lock.
    ///
    /// This uses OS-level file locking via `fs2`, which works across
    /// processes. If another process holds the lock, this returns
    /// `LockError::AlreadyLocked` immediately.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &FizzPaths) -> Result<Self, LockError> {
        let fizz_dir = paths.fizz_dir();
        fs::create_dir_all(&fizz_dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", fizz_dir.display(), e))
        })?;

        let path = paths.lock_path();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Try to acquire the lock, returning None if already held.
    pub fn try_acquire(paths: &FizzPaths) -> Result<Option<Self>, LockError> {
        match Self::acquire(paths) {
            Ok(lock) => Ok(Some(lock)),
            Err(LockError::AlreadyLocked) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock explicitly.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_paths(dir: &Path) -> FizzPaths {
        FizzPaths::with_defaults(dir.to_path_buf())
    }

    #[test]
    fn lock_acquire_succeeds() {
        let temp = TempDir::new().expect("create temp dir");
        let paths = test_paths(temp.path());

        let lock = WorkspaceLock::acquire(&paths).expect("acquire lock");
        assert!(lock.is_held());
        assert!(lock.path().exists());
        assert_eq!(lock.path(), paths.lock_path());
    }

    #[test]
    fn lock_creates_fizz_directory() {
        let temp = TempDir::new().expect("create temp dir");
        let paths = test_paths(temp.path());

        assert!(!paths.fizz_dir().exists());
        let _lock = WorkspaceLock::acquire(&paths).expect("acquire lock");
        assert!(paths.fizz_dir().exists());
    }

    #[test]
    fn lock_prevents_second_acquire() {
        let temp = TempDir::new().expect("create temp dir");
        let paths = test_paths(temp.path());

        let _lock1 = WorkspaceLock::acquire(&paths).expect("first acquire");

        let result = WorkspaceLock::acquire(&paths);
        assert!(matches!(result, Err(LockError::AlreadyLocked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = TempDir::new().expect("create temp dir");
        let paths = test_paths(temp.path());

        {
            let lock = WorkspaceLock::acquire(&paths).expect("first acquire");
            assert!(lock.is_held());
        }

        let lock2 = WorkspaceLock::acquire(&paths).expect("second acquire");
        assert!(lock2.is_held());
    }

    #[test]
    fn release_is_repeatable() {
        let temp = TempDir::new().expect("create temp dir");
        let paths = test_paths(temp.path());

        let mut lock = WorkspaceLock::acquire(&paths).expect("acquire");
        lock.release().expect("first release");
        lock.release().expect("second release should be ok");
        assert!(!lock.is_held());

        let lock2 = WorkspaceLock::acquire(&paths).expect("reacquire");
        assert!(lock2.is_held());
    }

    #[test]
    fn try_acquire_returns_none_when_locked() {
        let temp = TempDir::new().expect("create temp dir");
        let paths = test_paths(temp.path());

        let _lock1 = WorkspaceLock::acquire(&paths).expect("first acquire");

        let result = WorkspaceLock::try_acquire(&paths).expect("try_acquire");
        assert!(result.is_none());
    }
}
