//! Shared helpers for registry tests.

#![allow(dead_code)]

use bamtest_model::{BankAccount, IbanIssuanceStatus, Timestamp, User};
use bamtest_registry::{Environment, RegistryConfig, RegistryStore};
use chrono::NaiveDate;
use std::time::Duration;
use tempfile::TempDir;

/// A store rooted in a fresh temporary directory.
pub fn temp_store(env: Environment) -> (TempDir, RegistryStore) {
    let dir = TempDir::new().unwrap();
    let store = RegistryStore::open(config_in(&dir), env);
    (dir, store)
}

pub fn config_in(dir: &TempDir) -> RegistryConfig {
    RegistryConfig::new(dir.path()).with_poll_interval(Duration::from_millis(5))
}

pub fn account(id: u64) -> BankAccount {
    BankAccount {
        id,
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

/// A registered user, optionally owning one account.
pub fn registered_user(id: u64, with_account: bool) -> User {
    let mut user = User::new(format!("USER{id}"), "PW123");
    user.assign_id(id).unwrap();
    if with_account {
        user.add_bank_account(account(id * 100));
    }
    user
}

/// Routes library logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
