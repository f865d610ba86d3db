//! Error types for the entity model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building, decoding or reconciling entities.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A user already carries a server-assigned id and a different one was offered.
    #[error("user {username} already has id {current}, refusing to reassign to {attempted}")]
    IdAlreadyAssigned {
        username: String,
        current: u64,
        attempted: u64,
    },

    /// A `bank_accounts` key does not match the nested account's id.
    #[error("bank account stored under key {key:?} has id {account_id}")]
    AccountKeyMismatch { key: String, account_id: u64 },

    /// A registry record is stored under a key other than its user id.
    #[error("user record stored under key {key:?} has id {id:?}")]
    UserKeyMismatch { key: String, id: Option<u64> },

    /// Reconciliation was asked to compare a bank account with something else.
    #[error("cannot reconcile BankAccount with {found}: {reason}")]
    TypeMismatch { found: String, reason: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
