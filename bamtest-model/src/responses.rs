//! Response bodies of the auth endpoints.

use crate::validation::{Validate, require_non_blank};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Body of a successful signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub id: i64,
    pub username: String,
}

impl Validate for RegistrationResponse {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.id <= 0 {
            errors.push(format!("id must be positive, got {}", self.id));
        }
        errors.extend(require_non_blank("username", &self.username));
        errors
    }
}

/// Body of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "apiKey")]
    pub api_key: String,
    #[serde(alias = "expiresAt")]
    pub expires_at: DateTime<FixedOffset>,
}

impl LoginResponse {
    /// Checks the login rules as of `now`.
    #[must_use]
    pub fn violations_at(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut errors = Vec::new();
        if self.api_key.is_empty() {
            errors.push("api_key must not be empty".to_string());
        }
        if self.expires_at <= now {
            errors.push(format!(
                "expires_at must be in the future, got {}",
                self.expires_at.to_rfc3339()
            ));
        }
        errors
    }
}

impl Validate for LoginResponse {
    fn validate(&self) -> Vec<String> {
        self.violations_at(Utc::now())
    }
}

/// Error body returned for rejected credentials or missing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnauthorizedResponse {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl Validate for UnauthorizedResponse {
    fn validate(&self) -> Vec<String> {
        [
            ("timestamp", &self.timestamp),
            ("error", &self.error),
            ("message", &self.message),
            ("path", &self.path),
        ]
        .into_iter()
        .filter_map(|(field, value)| require_non_blank(field, value))
        .collect()
    }
}
