use crate::account::BankAccount;
use crate::reconcile::{AccountDiff, AccountField};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a test asks the server to create. Not an entity: it has no id and
/// every field may be left unset (or deliberately malformed) by a test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankAccountCreationInfo {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub initial_deposit: Option<f64>,
}

impl BankAccountCreationInfo {
    /// Builds a fully populated request.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: impl Into<String>,
        initial_deposit: f64,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            date_of_birth: Some(date_of_birth.into()),
            initial_deposit: Some(initial_deposit),
        }
    }

    /// Returns true when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.date_of_birth.is_none()
            && self.initial_deposit.is_none()
    }

    /// Compares what was sent with the account the server created.
    ///
    /// Unset request fields and `excluded` fields are skipped. Values are
    /// reported as `(sent, received)`.
    #[must_use]
    pub fn diff_against(&self, account: &BankAccount, excluded: &[AccountField]) -> AccountDiff {
        let sent = [
            (AccountField::FirstName, self.first_name.as_deref().map(Value::from)),
            (AccountField::LastName, self.last_name.as_deref().map(Value::from)),
            (AccountField::DateOfBirth, self.date_of_birth.as_deref().map(Value::from)),
            (AccountField::InitialDeposit, self.initial_deposit.map(Value::from)),
        ];

        let mut diff = AccountDiff::default();
        for (field, value) in sent {
            let Some(value) = value else { continue };
            if excluded.contains(&field) {
                continue;
            }
            let received = field.value_of(account);
            if value != received {
                diff.record(field, value, received);
            }
        }
        diff
    }
}
