//! Entity model for the bank-account-manager API tests.
//!
//! - [`User`]: a signup user and its registry record form
//! - [`BankAccount`]: an immutable server snapshot of an account
//! - [`BankAccountCreationInfo`]: what a test asks the server to create
//! - [`reconcile`]: tolerant comparison of expected vs observed accounts
//! - [`validation`]: response checks that collect every error
//! - [`SecretMode`]: explicit password masking for formatted output

mod account;
mod creation_info;
mod error;
pub mod reconcile;
mod responses;
mod secrets;
mod user;
pub mod validation;

pub use account::{BankAccount, IbanIssuanceStatus, Timestamp};
pub use creation_info::BankAccountCreationInfo;
pub use error::{ModelError, ModelResult};
pub use reconcile::{AccountDiff, AccountField, Reconciler};
pub use responses::{LoginResponse, RegistrationResponse, UnauthorizedResponse};
pub use secrets::{MASK, SecretMode};
pub use user::{GENERATED_CREDENTIAL_LEN, User, UserDisplay, random_credential};
pub use validation::{Validate, ValidationOutcome, validate_response};
