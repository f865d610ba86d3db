//! Shared fixtures for model tests.

#![allow(dead_code)]

use bamtest_model::{BankAccount, IbanIssuanceStatus, Timestamp};
use chrono::NaiveDate;

/// The account used throughout the reconciliation scenarios: pending IBAN,
/// issuance just requested.
pub fn requested_account() -> BankAccount {
    BankAccount {
        id: 1,
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        full_name: "John Doe".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        initial_deposit: 1000.0,
        iban_issuance_status: IbanIssuanceStatus::Requested,
        created_at: Timestamp::from("2024-01-01T00:00:00Z"),
        updated_at: Timestamp::from("2024-01-01T00:00:00Z"),
        iban: None,
    }
}

/// Same account after the server issued an IBAN.
pub fn issued_account() -> BankAccount {
    BankAccount {
        iban_issuance_status: IbanIssuanceStatus::Issued,
        updated_at: Timestamp::from("2024-01-02T00:00:00Z"),
        iban: Some("GB33BUKB20201555555555".to_string()),
        ..requested_account()
    }
}

pub fn account_with_id(id: u64) -> BankAccount {
    BankAccount {
        id,
        ..requested_account()
    }
}
