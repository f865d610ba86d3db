//! Deployment targets a test run can point at.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the fixed deployment targets. Each has its own registry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    Local,
    Dev,
    #[default]
    Test,
    Staging,
    Prod,
}

impl Environment {
    /// Every known environment.
    pub const ALL: [Self; 5] = [Self::Local, Self::Dev, Self::Test, Self::Staging, Self::Prod];

    /// Returns the upper-case name used on the command line and in file names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Dev => "DEV",
            Self::Test => "TEST",
            Self::Staging => "STAGING",
            Self::Prod => "PROD",
        }
    }

    /// Name of the registry file for this environment.
    #[must_use]
    pub fn registry_file_name(&self) -> String {
        format!("{}_ENV_USERS.json", self.as_str())
    }

    /// Production only runs tests marked safe for it; nothing may be
    /// deleted from its registry without an explicit override.
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown environment name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown environment {0:?} (expected one of LOCAL, DEV, TEST, STAGING, PROD)")]
pub struct ParseEnvironmentError(pub String);

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnvironmentError(s.to_string()))
    }
}
