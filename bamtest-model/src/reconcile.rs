//! Reconciliation of an expected bank account against a server snapshot.
//!
//! The server mutates some fields on its own schedule: `updated_at` moves on
//! every write and `iban_issuance_status` advances asynchronously. Those two
//! fields are never compared. The IBAN itself is compared only when both
//! sides carry one, so an account whose IBAN is still pending on either side
//! is not reported as a mismatch.
//!
//! [`Reconciler::equal`] is defined as an empty [`Reconciler::diff`], so the
//! two can never disagree.

use crate::account::BankAccount;
use crate::error::{ModelError, ModelResult};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A comparable field of a [`BankAccount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccountField {
    Id,
    FirstName,
    LastName,
    FullName,
    DateOfBirth,
    InitialDeposit,
    IbanIssuanceStatus,
    CreatedAt,
    UpdatedAt,
    Iban,
}

impl AccountField {
    /// Every field, in wire order.
    pub const ALL: [Self; 10] = [
        Self::Id,
        Self::FirstName,
        Self::LastName,
        Self::FullName,
        Self::DateOfBirth,
        Self::InitialDeposit,
        Self::IbanIssuanceStatus,
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::Iban,
    ];

    /// Fields that change server-side independently of the fields under test.
    pub const ALWAYS_EXCLUDED: [Self; 2] = [Self::UpdatedAt, Self::IbanIssuanceStatus];

    /// Returns the JSON name of the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::FullName => "full_name",
            Self::DateOfBirth => "date_of_birth",
            Self::InitialDeposit => "initial_deposit",
            Self::IbanIssuanceStatus => "iban_issuance_status",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Iban => "iban",
        }
    }

    /// Looks a field up by its JSON name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Extracts this field from an account as a JSON value.
    #[must_use]
    pub fn value_of(&self, account: &BankAccount) -> Value {
        match self {
            Self::Id => Value::from(account.id),
            Self::FirstName => Value::from(account.first_name.as_str()),
            Self::LastName => Value::from(account.last_name.as_str()),
            Self::FullName => Value::from(account.full_name.as_str()),
            Self::DateOfBirth => Value::from(account.date_of_birth.to_string()),
            Self::InitialDeposit => Value::from(account.initial_deposit),
            Self::IbanIssuanceStatus => Value::from(account.iban_issuance_status.as_str()),
            Self::CreatedAt => Value::from(account.created_at.as_str()),
            Self::UpdatedAt => Value::from(account.updated_at.as_str()),
            Self::Iban => account.iban.as_deref().map_or(Value::Null, Value::from),
        }
    }
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields that differ between two snapshots, with `(expected, observed)` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountDiff {
    fields: BTreeMap<AccountField, (Value, Value)>,
}

impl AccountDiff {
    pub(crate) fn record(&mut self, field: AccountField, expected: Value, observed: Value) {
        self.fields.insert(field, (expected, observed));
    }

    /// Returns true when no compared field differs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of differing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns the `(expected, observed)` pair for a field, if it differs.
    #[must_use]
    pub fn get(&self, field: AccountField) -> Option<&(Value, Value)> {
        self.fields.get(&field)
    }

    /// Iterates the differing fields in wire order.
    pub fn fields(&self) -> impl Iterator<Item = AccountField> + '_ {
        self.fields.keys().copied()
    }

    /// Converts into a map keyed by JSON field name.
    #[must_use]
    pub fn into_named(self) -> BTreeMap<&'static str, (Value, Value)> {
        self.fields
            .into_iter()
            .map(|(field, values)| (field.name(), values))
            .collect()
    }
}

impl fmt::Display for AccountDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str("no differences");
        }
        for (i, (field, (expected, observed))) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: expected {expected}, got {observed}")?;
        }
        Ok(())
    }
}

/// Compares bank accounts under a field-exclusion policy.
#[derive(Debug, Clone)]
pub struct Reconciler {
    excluded: BTreeSet<AccountField>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            excluded: AccountField::ALWAYS_EXCLUDED.into_iter().collect(),
        }
    }
}

impl Reconciler {
    /// Creates a reconciler with only the always-excluded fields skipped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Additionally skips `field`.
    #[must_use]
    pub fn excluding(mut self, field: AccountField) -> Self {
        self.excluded.insert(field);
        self
    }

    /// Returns true if `field` is never compared by this reconciler.
    #[must_use]
    pub fn is_excluded(&self, field: AccountField) -> bool {
        self.excluded.contains(&field)
    }

    /// Returns the fields that differ between `expected` and `observed`.
    ///
    /// `iban` is skipped when either side lacks one, not only the expected
    /// side, so a server that drops an issued IBAN is not reported here.
    #[must_use]
    pub fn diff(&self, expected: &BankAccount, observed: &BankAccount) -> AccountDiff {
        let mut diff = AccountDiff::default();
        for field in AccountField::ALL {
            if self.is_excluded(field) {
                continue;
            }
            if field == AccountField::Iban && !(expected.has_iban() && observed.has_iban()) {
                continue;
            }
            let (a, b) = (field.value_of(expected), field.value_of(observed));
            if a != b {
                diff.record(field, a, b);
            }
        }
        diff
    }

    /// Returns true when no compared field differs.
    #[must_use]
    pub fn equal(&self, expected: &BankAccount, observed: &BankAccount) -> bool {
        self.diff(expected, observed).is_empty()
    }

    /// Diffs against a raw server payload.
    ///
    /// Fails with [`ModelError::TypeMismatch`] when the payload is not
    /// shaped like a bank account.
    pub fn diff_value(&self, expected: &BankAccount, observed: &Value) -> ModelResult<AccountDiff> {
        if !observed.is_object() {
            return Err(ModelError::TypeMismatch {
                found: json_kind(observed).to_string(),
                reason: "expected a JSON object".to_string(),
            });
        }
        let observed: BankAccount =
            serde_json::from_value(observed.clone()).map_err(|e| ModelError::TypeMismatch {
                found: "object".to_string(),
                reason: e.to_string(),
            })?;
        Ok(self.diff(expected, &observed))
    }
}

/// [`Reconciler::diff`] with the default exclusions.
#[must_use]
pub fn diff(expected: &BankAccount, observed: &BankAccount) -> AccountDiff {
    Reconciler::default().diff(expected, observed)
}

/// [`Reconciler::equal`] with the default exclusions.
#[must_use]
pub fn equal(expected: &BankAccount, observed: &BankAccount) -> bool {
    Reconciler::default().equal(expected, observed)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
