//! Watch command - run the poller and print every snapshot.

use anyhow::Result;
use clap::Args;
use smarthub_store::{Config, MIN_INTERVAL_SECS, Poller, StoreError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::require_config;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured interval).
    #[arg(long, short)]
    pub interval: Option<u64>,
}

/// Runs the watch command until Ctrl+C.
pub async fn run(args: &WatchArgs, cli: &Cli, config: Result<Config, StoreError>) -> Result<ExitCode> {
    let config = require_config(config)?;
    let interval = args.interval.map_or_else(
        || config.polling.interval(),
        |secs| Duration::from_secs(secs.max(MIN_INTERVAL_SECS)),
    );

    let client = config.build_client()?;
    let poller = Poller::new(client, interval);
    let mut reader = poller.reader();
    let identity = reader.identity().clone();

    let cancel = CancellationToken::new();
    let handle = poller.spawn(cancel.clone());

    info!(interval_secs = interval.as_secs(), "Starting watch mode");
    if cli.format == OutputFormat::Text {
        println!(
            "Watching {} every {}s. Press Ctrl+C to exit.",
            identity.device_name(),
            interval.as_secs()
        );
    }

    let text = TextFormatter::new(!cli.no_color);
    let json = JsonFormatter::new(cli.pretty);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            changed = reader.changed() => {
                let Some(snapshot) = changed else {
                    warn!("Poller stopped unexpectedly");
                    break;
                };
                let sensors = reader.sensors_for(&snapshot);
                match cli.format {
                    OutputFormat::Text => println!("{}", text.format_snapshot(&snapshot, &sensors)),
                    OutputFormat::Json => {
                        let states = sensors.iter().map(|s| s.state()).collect();
                        println!("{}", json.format_snapshot(&identity, &snapshot, states)?);
                    }
                }
            }
        }
    }

    cancel.cancel();
    handle.await?;

    Ok(ExitCode::Success)
}
