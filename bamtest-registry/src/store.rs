//! The registry file for one environment.
//!
//! Every mutation is a read-modify-write of the whole file under the
//! advisory lock, finished by an atomic rename. Readers that skip the lock
//! may see the previous or the next version of the file, never a partial
//! one.

use crate::config::{CorruptStorePolicy, RegistryConfig};
use crate::environment::Environment;
use crate::error::{RegistryError, RegistryResult};
use crate::lock::{FileLock, LockGuard};
use crate::selector::{self, UserFilter};
use bamtest_model::User;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Raw registry content: user id → serialized user record.
pub type RawRegistry = serde_json::Map<String, Value>;

/// File-backed registry of fixture users for one environment.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    config: RegistryConfig,
    environment: Environment,
    path: PathBuf,
    lock: FileLock,
}

impl RegistryStore {
    /// Opens the registry for `environment`. Nothing touches the disk until
    /// the first operation.
    #[must_use]
    pub fn open(config: RegistryConfig, environment: Environment) -> Self {
        let path = config.registry_path(environment);
        let lock = FileLock::for_data_file(&path);
        Self {
            config,
            environment,
            path,
            lock,
        }
    }

    /// Environment this registry belongs to.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Path of the registry file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sibling lock marker.
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        self.lock.path()
    }

    /// Reads the whole registry.
    ///
    /// A missing file is created as `{}` and read as empty. Content that is
    /// not a JSON object fails with [`RegistryError::Decode`].
    pub fn load(&self) -> RegistryResult<RawRegistry> {
        match fs::read_to_string(&self.path) {
            Ok(text) => self.decode(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => self.bootstrap(),
            Err(e) => Err(RegistryError::io(&self.path, e)),
        }
    }

    /// Merges `{key: record}` into the registry, replacing any existing
    /// record under `key`.
    pub fn merge_and_save(&self, key: &str, record: Value) -> RegistryResult<()> {
        let _guard = self.lock()?;
        let mut registry = self.read_for_write()?;
        if registry.insert(key.to_string(), record).is_some() {
            debug!("Replacing registry record {} in {}", key, self.environment);
        }
        self.write(&registry)?;
        debug!("Saved registry record {} to {}", key, self.path.display());
        Ok(())
    }

    /// Stores a registered user under its id.
    pub fn save_user(&self, user: &User) -> RegistryResult<()> {
        let key = user.registry_key().ok_or_else(|| RegistryError::MissingUserId {
            username: user.username.clone(),
        })?;
        self.merge_and_save(&key, user.to_record()?)
    }

    /// Deletes the record under `key`. Returns false if there was none.
    pub fn remove(&self, key: &str) -> RegistryResult<bool> {
        let _guard = self.lock()?;
        let mut registry = self.read_for_write()?;
        if registry.remove(key).is_none() {
            return Ok(false);
        }
        self.write(&registry)?;
        info!("Removed registry record {} from {}", key, self.environment);
        Ok(true)
    }

    /// Reads and decodes one user.
    pub fn load_user(&self, key: &str) -> RegistryResult<Option<User>> {
        self.load()?
            .get(key)
            .map(|record| selector::decode_record(key, record).map_err(RegistryError::from))
            .transpose()
    }

    /// Picks a random user passing `filter`.
    pub fn select_random_user(&self, filter: UserFilter) -> RegistryResult<User> {
        let raw = self.load()?;
        selector::select_random(&raw, filter, &mut rand::thread_rng())
            .map_err(|e| e.in_environment(self.environment))
    }

    fn lock(&self) -> RegistryResult<LockGuard> {
        self.lock
            .acquire(self.config.lock_timeout(), self.config.poll_interval())
    }

    fn decode(&self, text: &str) -> RegistryResult<RawRegistry> {
        serde_json::from_str(text).map_err(|source| RegistryError::Decode {
            environment: self.environment,
            path: self.path.clone(),
            source,
        })
    }

    /// Creates an empty registry unless another writer got there first.
    fn bootstrap(&self) -> RegistryResult<RawRegistry> {
        let _guard = self.lock()?;
        match fs::read_to_string(&self.path) {
            Ok(text) => self.decode(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let empty = RawRegistry::new();
                self.write(&empty)?;
                info!("Created empty {} registry at {}", self.environment, self.path.display());
                Ok(empty)
            }
            Err(e) => Err(RegistryError::io(&self.path, e)),
        }
    }

    /// Reads the current content for a write. Must hold the lock.
    fn read_for_write(&self) -> RegistryResult<RawRegistry> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RawRegistry::new()),
            Err(e) => return Err(RegistryError::io(&self.path, e)),
        };
        match serde_json::from_str::<RawRegistry>(&text) {
            Ok(registry) => Ok(registry),
            Err(e) => match self.config.corrupt_policy() {
                CorruptStorePolicy::TreatAsEmpty => {
                    warn!(
                        "Registry {} is corrupt ({}), rewriting it from an empty mapping",
                        self.path.display(),
                        e
                    );
                    Ok(RawRegistry::new())
                }
                CorruptStorePolicy::Abort => Err(RegistryError::CorruptStore {
                    environment: self.environment,
                    path: self.path.clone(),
                    reason: e.to_string(),
                }),
            },
        }
    }

    /// Replaces the file atomically. Must hold the lock.
    fn write(&self, registry: &RawRegistry) -> RegistryResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| RegistryError::io(dir, e))?;

        let mut text = serde_json::to_string_pretty(registry)?;
        text.push('\n');

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RegistryError::io(dir, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| RegistryError::io(tmp.path(), e))?;

        // The temp file is created owner-only; a rewrite keeps the mode of
        // the file it replaces.
        match fs::metadata(&self.path) {
            Ok(existing) => tmp
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| RegistryError::io(tmp.path(), e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(RegistryError::io(&self.path, e)),
        }

        tmp.persist(&self.path)
            .map_err(|e| RegistryError::io(&self.path, e.error))?;
        Ok(())
    }
}
