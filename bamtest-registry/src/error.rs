//! Error types for the registry.

use crate::environment::Environment;
use crate::selector::UserFilter;
use bamtest_model::ModelError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while reading, writing or selecting from a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File system error.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry file could not be decoded on a read.
    #[error("registry for {environment} at {} is unreadable: {source}", .path.display())]
    Decode {
        environment: Environment,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The registry file could not be decoded on a write and the configured
    /// policy forbids discarding it.
    #[error("registry for {environment} at {} is corrupt, refusing to overwrite: {reason}", .path.display())]
    CorruptStore {
        environment: Environment,
        path: PathBuf,
        reason: String,
    },

    /// No decodable record satisfied the selection filter.
    #[error(
        "no registered user{} matches filter '{filter}' ({total} records, {rejected} undecodable)",
        environment_suffix(.environment)
    )]
    NoMatchingRecord {
        environment: Option<Environment>,
        filter: UserFilter,
        total: usize,
        rejected: usize,
    },

    /// The advisory lock was not acquired within the configured timeout.
    #[error("timed out after {waited:?} waiting for lock {}", .path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    /// Only users with a server-assigned id can be stored.
    #[error("user {username} has no server id and cannot be stored")]
    MissingUserId { username: String },

    /// Entity model error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attaches the environment to a selection failure.
    #[must_use]
    pub fn in_environment(self, env: Environment) -> Self {
        match self {
            Self::NoMatchingRecord {
                filter,
                total,
                rejected,
                ..
            } => Self::NoMatchingRecord {
                environment: Some(env),
                filter,
                total,
                rejected,
            },
            other => other,
        }
    }
}

fn environment_suffix(environment: &Option<Environment>) -> String {
    environment.map(|env| format!(" in {env}")).unwrap_or_default()
}
