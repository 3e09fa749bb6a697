//! Error types for ownermatch.
//!
//! All errors are strongly typed using thiserror. Only configuration can
//! fail: resolving a record has no error path, so everything here is raised
//! before the first record is processed.

use thiserror::Error;

/// Configuration errors reported at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The requested match mode is not one of the supported modes.
    #[error("{mode} is not supported")]
    UnsupportedMatchMode {
        /// The rejected value, as given.
        mode: String,
    },

    /// The header list was empty.
    #[error("Headers cannot be empty")]
    EmptyHeaders,

    /// The owner field name was empty or whitespace.
    #[error("Owner field name cannot be empty")]
    EmptyOwnerField,

    /// The owner id prefix was empty.
    #[error("Owner id prefix cannot be empty")]
    EmptyIdPrefix,

    /// A required builder setting was never supplied.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// Name of the missing setting.
        field: String,
    },
}

impl ConfigError {
    /// Creates an unsupported-mode error for the given raw value.
    #[must_use]
    pub fn unsupported(mode: impl Into<String>) -> Self {
        Self::UnsupportedMatchMode { mode: mode.into() }
    }

    /// Returns true if the requested match mode was rejected.
    #[must_use]
    pub const fn is_unsupported_mode(&self) -> bool {
        matches!(self, Self::UnsupportedMatchMode { .. })
    }
}

/// Result type alias for configuration steps.
pub type ConfigResult<T> = Result<T, ConfigError>;
