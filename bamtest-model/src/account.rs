//! Server-side bank account snapshots.
//!
//! A [`BankAccount`] is parsed from an account creation or retrieval
//! response and is never edited in place: a newer response produces a new
//! snapshot that replaces the old one wholesale.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the IBAN attached to an account. Issuance completes
/// asynchronously on the server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IbanIssuanceStatus {
    Requested,
    Issued,
    Rejected,
    Successful,
    Failed,
}

impl IbanIssuanceStatus {
    /// Every status the server may report.
    pub const ALL: [Self; 5] = [
        Self::Requested,
        Self::Issued,
        Self::Rejected,
        Self::Successful,
        Self::Failed,
    ];

    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::Issued => "ISSUED",
            Self::Rejected => "REJECTED",
            Self::Successful => "SUCCESSFUL",
            Self::Failed => "FAILED",
        }
    }

    /// Returns true once the server has stopped working on the IBAN.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Requested)
    }
}

impl fmt::Display for IbanIssuanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server-assigned ISO-8601 timestamp, kept verbatim.
///
/// The server does not always include an offset, so the raw text is the
/// source of truth and [`Timestamp::parse`] is used only for validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Wraps a raw timestamp string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the timestamp. Offset-less values are read as UTC.
    #[must_use]
    pub fn parse(&self) -> Option<DateTime<FixedOffset>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(dt);
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&self.0, fmt).ok())
            .map(|naive| naive.and_utc().fixed_offset())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Immutable snapshot of an account as reported by the server.
///
/// `PartialEq` is exact structural equality. Tolerant comparison between an
/// expected and an observed snapshot lives in [`crate::reconcile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub initial_deposit: f64,
    pub iban_issuance_status: IbanIssuanceStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub iban: Option<String>,
}

impl BankAccount {
    /// The full name the server derives from the holder's names.
    #[must_use]
    pub fn expected_full_name(first_name: &str, last_name: &str) -> String {
        format!("{first_name} {last_name}")
    }

    /// Key under which this account is stored in [`crate::User::bank_accounts`].
    #[must_use]
    pub fn key(&self) -> String {
        self.id.to_string()
    }

    /// Returns true once an IBAN has been issued for this account.
    #[must_use]
    pub fn has_iban(&self) -> bool {
        self.iban.is_some()
    }
}
