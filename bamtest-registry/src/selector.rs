//! Typed decoding of registry records and random fixture selection.
//!
//! Raw JSON is turned into [`User`] values exactly once, here. Records that
//! fail to decode are reported and excluded; everything downstream works on
//! typed users only.

use crate::error::{RegistryError, RegistryResult};
use crate::store::RawRegistry;
use bamtest_model::{ModelError, User};
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Which registered users a test can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserFilter {
    /// Any registered user.
    #[default]
    Any,
    /// Only users that already own at least one bank account.
    WithBankAccount,
}

impl UserFilter {
    /// Maps a "must have a bank account" flag onto a filter.
    #[must_use]
    pub const fn from_requirement(require_bank_account: bool) -> Self {
        if require_bank_account {
            Self::WithBankAccount
        } else {
            Self::Any
        }
    }

    /// Returns true if `user` passes the filter.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        match self {
            Self::Any => true,
            Self::WithBankAccount => user.has_bank_account(),
        }
    }
}

impl fmt::Display for UserFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any user"),
            Self::WithBankAccount => f.write_str("user with a bank account"),
        }
    }
}

/// A record that could not be turned into a [`User`].
#[derive(Debug)]
pub struct RecordRejection {
    pub key: String,
    pub error: ModelError,
}

/// Outcome of decoding every record of a registry.
#[derive(Debug, Default)]
pub struct DecodedRegistry {
    /// Successfully decoded users, keyed by registry key.
    pub users: BTreeMap<String, User>,
    /// Records that failed to decode.
    pub rejected: Vec<RecordRejection>,
}

impl DecodedRegistry {
    /// Users passing `filter`, in key order.
    pub fn matching(&self, filter: UserFilter) -> impl Iterator<Item = &User> + '_ {
        self.users.values().filter(move |user| filter.matches(user))
    }

    /// Total number of records seen, decoded or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.users.len() + self.rejected.len()
    }
}

/// Decodes one record and checks that it is stored under its own id.
pub fn decode_record(key: &str, record: &serde_json::Value) -> Result<User, ModelError> {
    let user = User::from_record(record.clone())?;
    if user.registry_key().as_deref() != Some(key) {
        return Err(ModelError::UserKeyMismatch {
            key: key.to_string(),
            id: user.id(),
        });
    }
    Ok(user)
}

/// Decodes every record of `raw`, separating failures from users.
#[must_use]
pub fn decode_registry(raw: &RawRegistry) -> DecodedRegistry {
    let mut decoded = DecodedRegistry::default();
    for (key, record) in raw {
        match decode_record(key, record) {
            Ok(user) => {
                decoded.users.insert(key.clone(), user);
            }
            Err(error) => {
                warn!("Skipping undecodable registry record {}: {}", key, error);
                decoded.rejected.push(RecordRejection {
                    key: key.clone(),
                    error,
                });
            }
        }
    }
    decoded
}

/// Picks one user passing `filter`, uniformly at random.
///
/// Fails with [`RegistryError::NoMatchingRecord`] when nothing qualifies.
/// Callers need a usable fixture, so this is never retried.
pub fn select_random<R: Rng + ?Sized>(
    raw: &RawRegistry,
    filter: UserFilter,
    rng: &mut R,
) -> RegistryResult<User> {
    let decoded = decode_registry(raw);
    let total = decoded.total();
    let rejected = decoded.rejected.len();

    let chosen = decoded
        .users
        .into_values()
        .filter(|user| filter.matches(user))
        .choose(rng);

    match chosen {
        Some(user) => {
            debug!("Selected registered user {} ({})", user.username, filter);
            Ok(user)
        }
        None => Err(RegistryError::NoMatchingRecord {
            environment: None,
            filter,
            total,
            rejected,
        }),
    }
}
