//! Auth command - check credentials without polling.

use anyhow::{Context, Result};
use smarthub_store::{Config, StoreError};

use super::require_config;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the auth command.
pub async fn run(cli: &Cli, config: Result<Config, StoreError>) -> Result<ExitCode> {
    let config = require_config(config)?;
    let mut client = config.build_client()?;
    let identity = client.identity();

    client
        .authenticate()
        .await
        .with_context(|| format!("Logging in to {}", identity.host))?;

    match cli.format {
        OutputFormat::Text => {
            println!("Authenticated as {} on {}", identity.email, identity.host);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "authenticated": true,
                "account": identity.unique_id(),
                "host": identity.host,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(ExitCode::Success)
}
