//! Response validation that collects every problem instead of stopping at
//! the first one.
//!
//! A test usually wants to report a wrong status code, a missing field and
//! a broken business rule in a single failure message, so
//! [`validate_response`] never returns early and never panics.

use crate::account::BankAccount;
use chrono::{Datelike, NaiveDate, Utc};
use serde::de::DeserializeOwned;

/// Youngest allowed account holder, in whole years.
pub const MIN_HOLDER_AGE: i32 = 18;
/// Oldest allowed account holder, in whole years.
pub const MAX_HOLDER_AGE: i32 = 130;
/// Allowed IBAN length range.
pub const IBAN_LEN: std::ops::RangeInclusive<usize> = 15..=34;

/// Field-level rules checked after a payload has been parsed.
pub trait Validate {
    /// Returns one human-readable message per violated rule.
    fn validate(&self) -> Vec<String>;
}

/// Result of checking one HTTP response against an expected shape.
#[derive(Debug, Clone)]
pub struct ValidationOutcome<T> {
    /// The parsed value, present only when parsing and every rule succeeded.
    pub data: Option<T>,
    /// Every problem found, in discovery order.
    pub errors: Vec<String>,
    /// Whether the observed status matched the expected one.
    pub status_matched: bool,
}

impl<T> ValidationOutcome<T> {
    /// Returns true when the status matched and the payload was valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into the parsed value or the collected errors.
    pub fn into_result(self) -> Result<T, Vec<String>> {
        match self.data {
            Some(data) if self.errors.is_empty() => Ok(data),
            _ => Err(self.errors),
        }
    }
}

/// Checks a response status and body against the shape `T`.
pub fn validate_response<T>(status: u16, expected_status: u16, body: &str) -> ValidationOutcome<T>
where
    T: DeserializeOwned + Validate,
{
    let mut errors = Vec::new();
    let status_matched = status == expected_status;
    if !status_matched {
        errors.push(format!(
            "HTTP status code {status} is not equal to expected status {expected_status}"
        ));
    }

    let shape = short_type_name::<T>();
    let data = match serde_json::from_str::<T>(body) {
        Ok(parsed) => {
            let violations = parsed.validate();
            if violations.is_empty() {
                Some(parsed)
            } else {
                errors.extend(
                    violations
                        .into_iter()
                        .map(|v| format!("server response violates {shape} rules: {v}")),
                );
                None
            }
        }
        Err(e) => {
            errors.push(format!(
                "server response does not match {shape} schema: {e}; raw response: {body}"
            ));
            None
        }
    };

    ValidationOutcome {
        data,
        errors,
        status_matched,
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Whole years between `date_of_birth` and `today`.
#[must_use]
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday = (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day());
    today.year() - date_of_birth.year() - i32::from(before_birthday)
}

/// Returns a message if `value` is blank.
pub(crate) fn require_non_blank(field: &str, value: &str) -> Option<String> {
    value
        .trim()
        .is_empty()
        .then(|| format!("{field} must not be empty"))
}

impl BankAccount {
    /// Checks the account rules as of `today`.
    #[must_use]
    pub fn violations_on(&self, today: NaiveDate) -> Vec<String> {
        let mut errors = Vec::new();

        if self.id == 0 {
            errors.push("id must be a positive integer".to_string());
        }
        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("full_name", &self.full_name),
        ] {
            errors.extend(require_non_blank(field, value));
        }

        let expected = Self::expected_full_name(&self.first_name, &self.last_name);
        if self.full_name != expected {
            errors.push(format!("full_name must be '{expected}', got '{}'", self.full_name));
        }

        let age = age_on(self.date_of_birth, today);
        if age < MIN_HOLDER_AGE {
            errors.push(format!("holder must be at least {MIN_HOLDER_AGE} years old, is {age}"));
        }
        if age > MAX_HOLDER_AGE {
            errors.push(format!("holder must be at most {MAX_HOLDER_AGE} years old, is {age}"));
        }

        if !self.initial_deposit.is_finite() || self.initial_deposit < 0.0 {
            errors.push(format!(
                "initial_deposit must be a non-negative amount, got {}",
                self.initial_deposit
            ));
        }

        if let Some(iban) = &self.iban {
            if !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
                errors.push(format!("iban must be alphanumeric, got '{iban}'"));
            }
            if !IBAN_LEN.contains(&iban.len()) {
                errors.push(format!(
                    "iban must be between {} and {} characters long, got {}",
                    IBAN_LEN.start(),
                    IBAN_LEN.end(),
                    iban.len()
                ));
            }
        }

        for (field, ts) in [("created_at", &self.created_at), ("updated_at", &self.updated_at)] {
            if ts.parse().is_none() {
                errors.push(format!("{field} must be an ISO-8601 timestamp, got '{ts}'"));
            }
        }

        errors
    }
}

impl Validate for BankAccount {
    fn validate(&self) -> Vec<String> {
        self.violations_on(Utc::now().date_naive())
    }
}
