//! Fetch command - authenticate, poll once, print the readings.

use anyhow::{Context, Result};
use smarthub_store::{Config, StoreError};
use tracing::info;

use super::require_config;
use crate::output::{JsonFormatter, ReadingsOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the fetch command.
pub async fn run(cli: &Cli, config: Result<Config, StoreError>) -> Result<ExitCode> {
    let config = require_config(config)?;
    let mut client = config.build_client()?;
    let identity = client.identity();

    info!(account = %identity, "Fetching readings");

    let readings = client
        .fetch_latest()
        .await
        .with_context(|| format!("Fetching readings for {}", identity.device_name()))?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_readings(&identity, readings.as_ref()));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&ReadingsOutput::new(&identity, readings))?);
        }
    }

    Ok(if readings.is_some() {
        ExitCode::Success
    } else {
        ExitCode::NoData
    })
}
