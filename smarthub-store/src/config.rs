//! Configuration management.

use serde::{Deserialize, Serialize};
use smarthub_core::{AccountIdentity, Credentials};
use smarthub_fetch::{RetryStrategy, SmartHubClient};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json, save_json};

/// Environment variable that overrides the configured password.
pub const PASSWORD_ENV: &str = "SMARTHUB_PASSWORD";

/// Shortest allowed polling interval.
pub const MIN_INTERVAL_SECS: u64 = 60;

// ============================================================================
// Config
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Portal account.
    pub account: AccountConfig,
    /// Polling settings.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Log level used when `--verbose` is not given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Portal account settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Login email.
    pub email: String,
    /// Login password. May be left out and supplied via [`PASSWORD_ENV`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Utility account number.
    pub account_id: String,
    /// Service location number.
    pub location_id: String,
    /// Portal host name.
    pub host: String,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("location_id", &self.location_id)
            .field("host", &self.host)
            .finish()
    }
}

/// Polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between fetch cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Poll attempts per fetch while the report is pending.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Seconds between pending retries.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_request_timeout_secs() -> u64 {
    smarthub_fetch::DEFAULT_TIMEOUT_SECS
}

fn default_max_attempts() -> u32 {
    smarthub_fetch::retry::DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_secs() -> u64 {
    smarthub_fetch::retry::DEFAULT_DELAY.as_secs()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl PollingConfig {
    /// Interval between fetch cycles, never shorter than [`MIN_INTERVAL_SECS`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(MIN_INTERVAL_SECS))
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Pending-retry strategy for the client.
    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy::new(self.max_attempts).with_delay(Duration::from_secs(self.retry_delay_secs))
    }
}

impl Config {
    /// Creates a configuration with default polling settings.
    pub fn new(account: AccountConfig) -> Self {
        Self {
            account,
            polling: PollingConfig::default(),
            log_level: default_log_level(),
        }
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotConfigured`] if the file does not exist, or
    /// an IO, serialization, or validation error.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found");
            return Err(StoreError::NotConfigured(path.to_path_buf()));
        }

        let config: Config = load_json(path).await?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        self.validate()?;
        save_json(path, self).await?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks the configuration for values that can never work.
    ///
    /// The password is not checked here because it may come from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), StoreError> {
        // Validate the account fields with a placeholder password.
        self.credentials_with_password("-")?;

        if self.polling.max_attempts == 0 {
            return Err(StoreError::Config(
                "polling.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.polling.request_timeout_secs == 0 {
            return Err(StoreError::Config(
                "polling.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Identity of the configured account.
    pub fn identity(&self) -> AccountIdentity {
        AccountIdentity {
            email: self.account.email.trim().to_string(),
            host: self.account.host.trim().to_lowercase(),
            account_id: self.account.account_id.trim().to_string(),
        }
    }

    /// Picks the password: a non-empty `env_password` wins over the file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingPassword`] if neither is set.
    pub fn resolve_password(&self, env_password: Option<&str>) -> Result<String, StoreError> {
        env_password
            .filter(|p| !p.is_empty())
            .or(self.account.password.as_deref().filter(|p| !p.is_empty()))
            .map(str::to_string)
            .ok_or(StoreError::MissingPassword)
    }

    /// Builds credentials, taking the password from [`PASSWORD_ENV`] or the file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingPassword`] or a validation error.
    pub fn credentials(&self) -> Result<Credentials, StoreError> {
        let env_password = std::env::var(PASSWORD_ENV).ok();
        let password = self.resolve_password(env_password.as_deref())?;
        self.credentials_with_password(&password)
    }

    fn credentials_with_password(&self, password: &str) -> Result<Credentials, StoreError> {
        let account = &self.account;
        Ok(Credentials::new(
            account.email.as_str(),
            password,
            account.account_id.as_str(),
            account.location_id.as_str(),
            account.host.as_str(),
        )?)
    }

    /// Builds a client with the configured timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials cannot be resolved or the client
    /// cannot be built.
    pub fn build_client(&self) -> Result<SmartHubClient, StoreError> {
        let client = SmartHubClient::with_timeout(self.credentials()?, self.polling.request_timeout())?
            .with_retry_strategy(self.polling.retry_strategy());
        Ok(client)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountConfig {
        AccountConfig {
            email: "user@example.com".to_string(),
            password: Some("from-file".to_string()),
            account_id: "12345".to_string(),
            location_id: "67890".to_string(),
            host: "myutility.smarthub.coop".to_string(),
        }
    }

    #[test]
    fn test_polling_defaults() {
        let polling = PollingConfig::default();
        assert_eq!(polling.interval(), Duration::from_secs(3600));
        assert_eq!(polling.request_timeout(), Duration::from_secs(30));

        let retry = polling.retry_strategy();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.delay, Duration::from_secs(2));
    }

    #[test]
    fn test_interval_is_clamped() {
        let polling = PollingConfig {
            interval_secs: 5,
            ..PollingConfig::default()
        };
        assert_eq!(polling.interval(), Duration::from_secs(MIN_INTERVAL_SECS));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let json = r#"{
            "account": {
                "email": "user@example.com",
                "account_id": "12345",
                "location_id": "67890",
                "host": "myutility.smarthub.coop"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.polling, PollingConfig::default());
        assert_eq!(config.log_level, "warn");
        assert!(config.account.password.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_password_resolution() {
        let config = Config::new(account());

        assert_eq!(config.resolve_password(Some("from-env")).unwrap(), "from-env");
        assert_eq!(config.resolve_password(Some("")).unwrap(), "from-file");
        assert_eq!(config.resolve_password(None).unwrap(), "from-file");

        let config = Config::new(AccountConfig {
            password: None,
            ..account()
        });
        assert!(matches!(
            config.resolve_password(None),
            Err(StoreError::MissingPassword)
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config::new(AccountConfig {
            host: "https://myutility.smarthub.coop".to_string(),
            ..account()
        });
        assert!(matches!(config.validate(), Err(StoreError::Config(_))));

        let config = Config::new(AccountConfig {
            account_id: String::new(),
            ..account()
        });
        assert!(matches!(config.validate(), Err(StoreError::Config(_))));

        let mut config = Config::new(account());
        config.polling.max_attempts = 0;
        assert!(matches!(config.validate(), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_identity() {
        let identity = Config::new(account()).identity();
        assert_eq!(identity.device_name(), "myutility.smarthub.coop (12345)");
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", account());
        assert!(!debug.contains("from-file"));
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut config = Config::new(account());
        config.polling.interval_secs = 900;
        config.save_to(&path).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_configured() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");

        let err = Config::load_from(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured(p) if p == path));
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"account": {"email": ""}}"#).await.unwrap();

        assert!(Config::load_from(&path).await.is_err());
    }
}
