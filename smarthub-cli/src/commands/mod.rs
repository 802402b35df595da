//! CLI command implementations.

pub mod auth;
pub mod config;
pub mod fetch;
pub mod sensors;
pub mod watch;

use anyhow::{Result, bail};
use smarthub_store::{Config, StoreError};

/// Unwraps the loaded configuration, pointing at `config init` when it is missing.
pub fn require_config(config: Result<Config, StoreError>) -> Result<Config> {
    match config {
        Ok(config) => Ok(config),
        Err(StoreError::NotConfigured(path)) => bail!(
            "No configuration found at {}. Run `smarthub config init` first.",
            path.display()
        ),
        Err(e) => Err(e.into()),
    }
}
