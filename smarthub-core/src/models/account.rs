//! Credentials and account identity.
//!
//! - [`Credentials`] - Everything needed to log in and select an account
//! - [`AccountIdentity`] - The subset that identifies a metering device

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::models::ReadingKind;

/// Device manufacturer reported for every account.
pub const MANUFACTURER: &str = "gagata";

/// Device model reported for every account.
pub const MODEL: &str = "Energy Monitor";

// ============================================================================
// Credentials
// ============================================================================

/// Portal credentials plus the account and service location to query.
///
/// Immutable once constructed. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
    account_id: String,
    location_id: String,
    host: String,
}

impl Credentials {
    /// Creates validated credentials.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] if any field is blank, or
    /// [`CoreError::InvalidHost`] if `host` is not a bare host name.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        account_id: impl Into<String>,
        location_id: impl Into<String>,
        host: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let credentials = Self {
            email: email.into().trim().to_string(),
            password: password.into(),
            account_id: account_id.into().trim().to_string(),
            location_id: location_id.into().trim().to_string(),
            host: host.into().trim().to_lowercase(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.email.is_empty() {
            return Err(CoreError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(CoreError::MissingField("password"));
        }
        if self.account_id.is_empty() {
            return Err(CoreError::MissingField("account_id"));
        }
        if self.location_id.is_empty() {
            return Err(CoreError::MissingField("location_id"));
        }
        validate_host(&self.host)
    }

    /// Login email, also sent as the portal user id.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Login password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Utility account number.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Service location number.
    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    /// Portal host name, e.g. `myutility.smarthub.coop`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the structured identity for these credentials.
    pub fn identity(&self) -> AccountIdentity {
        AccountIdentity {
            email: self.email.clone(),
            host: self.host.clone(),
            account_id: self.account_id.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("location_id", &self.location_id)
            .field("host", &self.host)
            .finish()
    }
}

/// Checks that `host` is a bare host name (optionally with a port).
fn validate_host(host: &str) -> Result<(), CoreError> {
    let invalid = |reason: &str| CoreError::InvalidHost {
        host: host.to_string(),
        reason: reason.to_string(),
    };

    if host.is_empty() {
        return Err(CoreError::MissingField("host"));
    }
    if host.contains("://") {
        return Err(invalid("expected a host name without a scheme"));
    }
    if host.contains('/') {
        return Err(invalid("expected a host name without a path"));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(invalid("host contains whitespace"));
    }
    Ok(())
}

// ============================================================================
// Account Identity
// ============================================================================

/// Stable identity of one metered account on one portal.
///
/// Derived values (unique id, device name, configuration URL) are computed
/// from the typed fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountIdentity {
    /// Login email.
    pub email: String,
    /// Portal host name.
    pub host: String,
    /// Utility account number.
    pub account_id: String,
}

impl AccountIdentity {
    /// Unique id in the `email_host_account` form used for device registration.
    pub fn unique_id(&self) -> String {
        format!("{}_{}_{}", self.email, self.host, self.account_id)
    }

    /// Unique id of the sensor publishing `kind` for this account.
    pub fn sensor_unique_id(&self, kind: ReadingKind) -> String {
        format!("{}_{}", self.unique_id(), kind.sensor_suffix())
    }

    /// Human-readable device name, e.g. `myutility.smarthub.coop (12345)`.
    pub fn device_name(&self) -> String {
        format!("{} ({})", self.host, self.account_id)
    }

    /// Link to the portal's web interface.
    pub fn configuration_url(&self) -> String {
        format!("https://{}/", self.host)
    }

    /// Device manufacturer.
    pub fn manufacturer(&self) -> &'static str {
        MANUFACTURER
    }

    /// Device model.
    pub fn model(&self) -> &'static str {
        MODEL
    }
}

impl fmt::Display for AccountIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.email, self.device_name())
    }
}

// ============================================================================
// Tests
// ============================================================================
