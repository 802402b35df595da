//! Fetch error types.

use smarthub_core::ParseError;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for one fetch cycle.
///
/// Every variant is scoped to a single `fetch_latest` call. The client holds
/// no state that a failure could corrupt; the next call authenticates again.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(AuthFailure),

    /// The poll endpoint answered with a non-200 status.
    #[error("Failed to retrieve energy data. HTTP status: {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// The report was still being computed when the retry budget ran out.
    #[error("Usage report still pending after {attempts} attempts")]
    StillPending {
        /// Number of poll requests sent.
        attempts: u32,
    },

    /// The poll response could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The poll request could not be sent or timed out.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The client was configured with unusable settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FetchError {
    /// Returns true if the next scheduled cycle might succeed without any
    /// change to configuration or credentials.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Auth(failure) => failure.is_transient(),
            Self::InvalidConfig(_) => false,
            Self::Http { .. } | Self::StillPending { .. } | Self::Parse(_) | Self::Transport(_) => {
                true
            }
        }
    }
}

impl From<AuthFailure> for FetchError {
    fn from(failure: AuthFailure) -> Self {
        Self::Auth(failure)
    }
}

// ============================================================================
// Auth Failure
// ============================================================================

/// Why authentication failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// The auth endpoint answered with a non-200 status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response carried no usable token.
    #[error("response did not include an authorization token")]
    MissingToken,

    /// The response body was not the expected JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The auth endpoint could not be reached.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),
}

impl AuthFailure {
    /// Returns true unless the portal rejected the credentials outright.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status(status) => !matches!(status, 400 | 401 | 403),
            Self::MissingToken => false,
            Self::InvalidResponse(_) | Self::Unreachable(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::StillPending { attempts: 5 }.is_transient());
        assert!(FetchError::Http { status: 503 }.is_transient());
        assert!(FetchError::Auth(AuthFailure::Status(502)).is_transient());
        assert!(!FetchError::Auth(AuthFailure::Status(401)).is_transient());
        assert!(!FetchError::Auth(AuthFailure::MissingToken).is_transient());
        assert!(!FetchError::InvalidConfig("bad".to_string()).is_transient());
    }

    #[test]
    fn test_messages() {
        let err = FetchError::Http { status: 500 };
        assert_eq!(
            err.to_string(),
            "Failed to retrieve energy data. HTTP status: 500"
        );

        let err = FetchError::from(AuthFailure::Status(401));
        assert_eq!(err.to_string(), "Authentication failed: HTTP status 401");
        assert!(matches!(err, FetchError::Auth(AuthFailure::Status(401))));
    }
}
