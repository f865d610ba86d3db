//! Secret masking for log and report output.
//!
//! The mode is passed explicitly to whatever formats an entity, so masking
//! can be tested without touching process state.

/// Replacement text for a hidden secret.
pub const MASK: &str = "***";

/// Whether secrets such as passwords may appear in formatted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretMode {
    /// Print secrets as-is.
    #[default]
    Show,
    /// Replace secrets with [`MASK`].
    Hide,
}

impl SecretMode {
    /// Maps a `--hide-secrets` style flag onto a mode.
    #[must_use]
    pub const fn from_hide_flag(hide: bool) -> Self {
        if hide { Self::Hide } else { Self::Show }
    }

    /// Returns true if secrets are hidden.
    #[must_use]
    pub const fn hides(&self) -> bool {
        matches!(self, Self::Hide)
    }

    /// Returns the secret, or [`MASK`] when hiding.
    #[must_use]
    pub fn mask<'a>(&self, secret: &'a str) -> &'a str {
        match self {
            Self::Show => secret,
            Self::Hide => MASK,
        }
    }
}
