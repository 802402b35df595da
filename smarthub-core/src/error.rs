//! Core error types for `SmartHub`.

use thiserror::Error;

/// Core error type for configuration and identity validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field was empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The portal host name is not usable.
    #[error("Invalid host '{host}': {reason}")]
    InvalidHost {
        /// The rejected host value.
        host: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Error raised when a poll payload does not have the expected shape.
///
/// Carries the JSON path of the offending value and a description of what
/// was found there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error parsing usage data at {path}: {cause}")]
pub struct ParseError {
    /// JSON path of the offending value, e.g. `data.ELECTRIC[0].series`.
    pub path: String,
    /// What was wrong with it.
    pub cause: String,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(path: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cause: cause.into(),
        }
    }
}
