//! Store error types.

use smarthub_core::CoreError;
use smarthub_fetch::FetchError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No configuration file exists yet.
    #[error("No configuration found at {}", .0.display())]
    NotConfigured(PathBuf),

    /// No password in the environment or the configuration file.
    #[error("No password configured (set {} or add it to the config file)", crate::config::PASSWORD_ENV)]
    MissingPassword,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client construction or fetch error.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        StoreError::Config(err.to_string())
    }
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Fetch(e) => e.is_transient(),
            StoreError::Io(_) => true,
            _ => false,
        }
    }
}
