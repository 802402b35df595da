// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `SmartHub` CLI - energy readings from a utility portal on the command line.
//!
//! # Examples
//!
//! ```bash
//! # Create a configuration
//! smarthub config init --email me@example.com --account-id 12345 \
//!     --location-id 67890 --host myutility.smarthub.coop
//!
//! # Fetch the latest readings (default command)
//! SMARTHUB_PASSWORD=... smarthub
//!
//! # JSON output
//! smarthub --format json --pretty
//!
//! # Check credentials only
//! smarthub auth
//!
//! # Poll continuously
//! smarthub watch --interval 900
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use smarthub_fetch::FetchError;
use smarthub_store::{Config, StoreError};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{auth, config, fetch, sensors, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// `SmartHub` CLI - utility energy readings.
#[derive(Parser)]
#[command(name = "smarthub")]
#[command(about = "Energy usage, cost, and demand from SmartHub utility portals")]
#[command(long_about = r#"
Reads the latest monthly energy usage, cost, and demand for one utility
account from a SmartHub customer portal.

The password can be stored in the config file or supplied through the
SMARTHUB_PASSWORD environment variable.

Exit codes:
  0  success
  1  error
  2  the portal returned no data point
  3  authentication failed
  4  the usage report was still pending

Examples:
  smarthub                       # Fetch the latest readings
  smarthub --format json         # JSON output
  smarthub auth                  # Check credentials
  smarthub watch                 # Poll on the configured interval
  smarthub sensors               # List sensors and device info
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'fetch' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the config file.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, no error messages).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Config file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the latest readings (default if no command specified).
    #[command(visible_alias = "f")]
    Fetch,

    /// Check the credentials by logging in.
    #[command(visible_alias = "a")]
    Auth,

    /// Poll on an interval and print every update.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),

    /// List sensors and device information.
    #[command(visible_alias = "s")]
    Sensors,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The portal answered without a data point.
    NoData = 2,
    /// Authentication failed.
    AuthFailed = 3,
    /// The report was still pending after every retry.
    StillPending = 4,
}

/// Picks the exit code for a failed command.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let fetch_error = err
        .downcast_ref::<FetchError>()
        .or_else(|| match err.downcast_ref::<StoreError>() {
            Some(StoreError::Fetch(e)) => Some(e),
            _ => None,
        });

    match fetch_error {
        Some(FetchError::Auth(_)) => ExitCode::AuthFailed,
        Some(FetchError::StillPending { .. }) => ExitCode::StillPending,
        _ => ExitCode::Error,
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: Option<&str>) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("smarthub=debug,info")
    } else {
        let level = level.unwrap_or("warn");
        EnvFilter::try_new(format!("smarthub={level}"))
            .unwrap_or_else(|_| EnvFilter::new("smarthub=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::load_from(&cli.config_path()).await;
    setup_logging(
        cli.verbose,
        cli.quiet,
        config.as_ref().ok().map(|c| c.log_level.as_str()),
    );

    let result = match &cli.command {
        Some(Commands::Fetch) | None => fetch::run(&cli, config).await,
        Some(Commands::Auth) => auth::run(&cli, config).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli, config).await,
        Some(Commands::Config(args)) => config::run(args, &cli, config).await,
        Some(Commands::Sensors) => sensors::run(&cli, config),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            exit_code_for(&e)
        }
    };

    std::process::exit(code as i32);
}
