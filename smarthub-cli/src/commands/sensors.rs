//! Sensors command - device and sensor metadata.

use anyhow::Result;
use smarthub_core::ReadingKind;
use smarthub_store::{Config, StoreError};

use super::require_config;
use crate::output::{DeviceOutput, JsonFormatter, SensorInfoOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the sensors command.
///
/// Only the account identity is needed, so no password is required.
pub fn run(cli: &Cli, config: Result<Config, StoreError>) -> Result<ExitCode> {
    let identity = require_config(config)?.identity();

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_sensors(&identity));
        }
        OutputFormat::Json => {
            let sensors: Vec<SensorInfoOutput> = ReadingKind::all()
                .iter()
                .map(|&kind| SensorInfoOutput::new(&identity, kind))
                .collect();
            let output = serde_json::json!({
                "device": DeviceOutput::from(&identity),
                "sensors": sensors,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(ExitCode::Success)
}
