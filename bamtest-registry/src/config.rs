//! Registry configuration.

use crate::environment::Environment;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding the registry files when none is configured.
pub const DEFAULT_DATA_DIR: &str = "user_accounts_resources/registered_users";

/// How often a bounded lock wait re-checks the lock.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What a write does when the existing registry file cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptStorePolicy {
    /// Log a warning and rewrite the file from an empty mapping. The
    /// unreadable content is lost.
    #[default]
    TreatAsEmpty,
    /// Fail the write with [`crate::RegistryError::CorruptStore`] and leave
    /// the file untouched.
    Abort,
}

/// Where registry files live and how writers coordinate.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    base_dir: PathBuf,
    lock_timeout: Option<Duration>,
    poll_interval: Duration,
    corrupt_policy: CorruptStorePolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl RegistryConfig {
    /// Creates a config rooted at `base_dir` with unbounded lock waits.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            lock_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            corrupt_policy: CorruptStorePolicy::default(),
        }
    }

    /// Bounds lock waits. `None` waits forever.
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Sets the re-check interval used by bounded lock waits.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the corrupt-file policy for writes.
    #[must_use]
    pub fn with_corrupt_policy(mut self, policy: CorruptStorePolicy) -> Self {
        self.corrupt_policy = policy;
        self
    }

    /// Directory holding the registry files.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Configured lock timeout.
    #[must_use]
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout
    }

    /// Configured poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Configured corrupt-file policy.
    #[must_use]
    pub fn corrupt_policy(&self) -> CorruptStorePolicy {
        self.corrupt_policy
    }

    /// Path of the registry file for `environment`.
    #[must_use]
    pub fn registry_path(&self, environment: Environment) -> PathBuf {
        self.base_dir.join(environment.registry_file_name())
    }
}
