//! Test users and their registry record form.

use crate::account::BankAccount;
use crate::creation_info::BankAccountCreationInfo;
use crate::error::{ModelError, ModelResult};
use crate::secrets::SecretMode;
use rand::Rng;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Length of generated usernames and passwords.
pub const GENERATED_CREDENTIAL_LEN: usize = 5;

const CREDENTIAL_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a random upper-case alphanumeric credential.
pub fn random_credential<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(CREDENTIAL_CHARSET[rng.gen_range(0..CREDENTIAL_CHARSET.len())]))
        .collect()
}

/// A signup user, as held by a test and as stored in the registry.
///
/// The bearer token is a per-session cache and is never serialized.
#[derive(Clone, PartialEq, Serialize)]
pub struct User {
    pub username: String,
    pub password: String,
    #[serde(skip)]
    pub token: Option<String>,
    id: Option<u64>,
    bank_accounts: BTreeMap<String, BankAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank_account_creation_info: Option<BankAccountCreationInfo>,
}

/// Wire shape of a registry record before its invariants are checked.
#[derive(Deserialize)]
struct UserRecord {
    username: String,
    password: String,
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    bank_accounts: Option<BTreeMap<String, BankAccount>>,
    #[serde(default)]
    bank_account_creation_info: Option<BankAccountCreationInfo>,
}

impl User {
    /// Creates an unregistered user.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            token: None,
            id: None,
            bank_accounts: BTreeMap::new(),
            bank_account_creation_info: None,
        }
    }

    /// Creates an unregistered user with random credentials.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let username = random_credential(rng, GENERATED_CREDENTIAL_LEN);
        let password = random_credential(rng, GENERATED_CREDENTIAL_LEN);
        Self::new(username, password)
    }

    /// Decodes a registry record, checking that every account is stored
    /// under the string form of its own id.
    pub fn from_record(record: Value) -> ModelResult<Self> {
        let raw: UserRecord = serde_json::from_value(record)?;
        let bank_accounts = raw.bank_accounts.unwrap_or_default();
        if let Some((key, account)) = bank_accounts.iter().find(|(key, a)| **key != a.key()) {
            return Err(ModelError::AccountKeyMismatch {
                key: key.clone(),
                account_id: account.id,
            });
        }
        Ok(Self {
            username: raw.username,
            password: raw.password,
            token: None,
            id: raw.id,
            bank_accounts,
            bank_account_creation_info: raw.bank_account_creation_info,
        })
    }

    /// Encodes the user as a registry record.
    pub fn to_record(&self) -> ModelResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// The server-assigned id, once registration has succeeded.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Returns true once the server has assigned an id.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.id.is_some()
    }

    /// Records the server-assigned id. Assigning the same id again is a
    /// no-op; a different id is rejected.
    pub fn assign_id(&mut self, id: u64) -> ModelResult<()> {
        match self.id {
            Some(current) if current != id => Err(ModelError::IdAlreadyAssigned {
                username: self.username.clone(),
                current,
                attempted: id,
            }),
            _ => {
                self.id = Some(id);
                Ok(())
            }
        }
    }

    /// Key under which this user is stored in the registry.
    #[must_use]
    pub fn registry_key(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }

    /// All known accounts, keyed by account id.
    #[must_use]
    pub fn bank_accounts(&self) -> &BTreeMap<String, BankAccount> {
        &self.bank_accounts
    }

    /// Returns true if the user owns at least one account.
    #[must_use]
    pub fn has_bank_account(&self) -> bool {
        !self.bank_accounts.is_empty()
    }

    /// Looks up an account by id.
    #[must_use]
    pub fn bank_account(&self, id: u64) -> Option<&BankAccount> {
        self.bank_accounts.get(&id.to_string())
    }

    /// Stores a snapshot, replacing any older snapshot of the same account.
    pub fn add_bank_account(&mut self, account: BankAccount) -> Option<BankAccount> {
        self.bank_accounts.insert(account.key(), account)
    }

    /// Picks one of the user's account ids at random.
    pub fn random_bank_account_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u64> {
        self.bank_accounts.values().choose(rng).map(|a| a.id)
    }

    /// The pending account creation request, if any.
    #[must_use]
    pub fn creation_info(&self) -> Option<&BankAccountCreationInfo> {
        self.bank_account_creation_info.as_ref()
    }

    /// Replaces the pending account creation request.
    pub fn set_creation_info(&mut self, info: BankAccountCreationInfo) {
        self.bank_account_creation_info = Some(info);
    }

    /// Formats the user for logs, masking the password according to `mode`.
    #[must_use]
    pub fn display(&self, mode: SecretMode) -> UserDisplay<'_> {
        UserDisplay { user: self, mode }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &crate::secrets::MASK)
            .field("token", &self.token.as_ref().map(|_| crate::secrets::MASK))
            .field("id", &self.id)
            .field("bank_accounts", &self.bank_accounts)
            .field("bank_account_creation_info", &self.bank_account_creation_info)
            .finish()
    }
}

/// [`fmt::Display`] adapter returned by [`User::display`].
pub struct UserDisplay<'a> {
    user: &'a User,
    mode: SecretMode,
}

impl fmt::Display for UserDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "username: {}, password: {}", self.user.username, self.mode.mask(&self.user.password))?;
        match self.user.id {
            Some(id) => write!(f, ", id: {id}")?,
            None => f.write_str(", id: unregistered")?,
        }
        write!(f, ", bank accounts: {}", self.user.bank_accounts.len())
    }
}
