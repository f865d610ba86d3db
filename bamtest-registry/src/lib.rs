//! Shared registry of fixture users for the bank-account-manager API tests.
//!
//! Test runs register users against a live environment and keep them in one
//! JSON file per environment so later runs can reuse them instead of signing
//! up again. Several test processes may use the same file at once.
//!
//! # Storage
//!
//! - One file per [`Environment`]: `<base_dir>/<ENV>_ENV_USERS.json`
//! - Content is a JSON object: user id → user record
//! - A missing file reads as `{}` and is created on first access
//! - Writes merge one top-level key under an exclusive advisory lock on
//!   `<file>.lock` and replace the file atomically
//!
//! # Selection
//!
//! [`select_random`] decodes the raw mapping into typed users once and picks
//! one uniformly among those passing a [`UserFilter`].

mod config;
mod environment;
mod error;
mod lock;
pub mod selector;
mod store;

pub use config::{CorruptStorePolicy, DEFAULT_DATA_DIR, DEFAULT_POLL_INTERVAL, RegistryConfig};
pub use environment::{Environment, ParseEnvironmentError};
pub use error::{RegistryError, RegistryResult};
pub use lock::{FileLock, LockGuard};
pub use selector::{DecodedRegistry, RecordRejection, UserFilter, decode_registry, select_random};
pub use store::{RawRegistry, RegistryStore};
