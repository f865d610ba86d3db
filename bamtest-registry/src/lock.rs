//! Advisory lock on a sibling `.lock` file.
//!
//! The lock only excludes participants that take it; anything writing the
//! registry without it is not held back. Its content is never read.

use crate::error::{RegistryError, RegistryResult};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// An exclusive lock scoped to one data file.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    /// Creates a lock on the marker file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the lock guarding `data_file`, at `<data_file>.lock`.
    #[must_use]
    pub fn for_data_file(data_file: &Path) -> Self {
        let mut path = OsString::from(data_file.as_os_str());
        path.push(".lock");
        Self::new(path)
    }

    /// Path of the lock marker.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocks until the lock is held.
    ///
    /// With `timeout` set, the lock is polled every `poll_interval` and
    /// [`RegistryError::LockTimeout`] is returned once the timeout elapses.
    /// The lock is released when the returned guard is dropped.
    pub fn acquire(&self, timeout: Option<Duration>, poll_interval: Duration) -> RegistryResult<LockGuard> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| RegistryError::io(&self.path, e))?;

        let started = Instant::now();
        match timeout {
            None => file.lock().map_err(|e| RegistryError::io(&self.path, e))?,
            Some(limit) => loop {
                match file.try_lock() {
                    Ok(()) => break,
                    Err(TryLockError::WouldBlock) => {
                        let waited = started.elapsed();
                        if waited >= limit {
                            return Err(RegistryError::LockTimeout {
                                path: self.path.clone(),
                                waited,
                            });
                        }
                        thread::sleep(poll_interval.min(limit - waited));
                    }
                    Err(TryLockError::Error(e)) => return Err(RegistryError::io(&self.path, e)),
                }
            },
        }

        debug!("Acquired {} after {:?}", self.path.display(), started.elapsed());
        Ok(LockGuard {
            file,
            path: self.path.clone(),
        })
    }
}

/// Holds the lock until dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Path of the held lock marker.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match self.file.unlock() {
            Ok(()) => debug!("Released {}", self.path.display()),
            Err(e) => warn!("Failed to release {}: {}", self.path.display(), e),
        }
    }
}
