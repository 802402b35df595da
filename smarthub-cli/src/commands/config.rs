//! Config command - manage configuration.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use smarthub_store::persistence::default_config_dir;
use smarthub_store::{AccountConfig, Config, PASSWORD_ENV, PollingConfig, StoreError};

use super::require_config;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration (password redacted).
    Show,

    /// Show configuration paths.
    Path,

    /// Write a new configuration file.
    Init(InitArgs),
}

/// Arguments for `config init`.
#[derive(Args)]
pub struct InitArgs {
    /// Portal login email.
    #[arg(long)]
    pub email: String,

    /// Utility account number.
    #[arg(long)]
    pub account_id: String,

    /// Service location number.
    #[arg(long)]
    pub location_id: String,

    /// Portal host, e.g. myutility.smarthub.coop.
    #[arg(long)]
    pub host: String,

    /// Password to store in the file. Prefer the environment variable.
    #[arg(long)]
    pub password: Option<String>,

    /// Polling interval in seconds.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

/// Runs the config command.
pub async fn run(
    args: &ConfigArgs,
    cli: &Cli,
    config: Result<Config, StoreError>,
) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli, config)?,
        ConfigAction::Path => show_paths(cli)?,
        ConfigAction::Init(init) => init_config(init, cli).await?,
    }
    Ok(ExitCode::Success)
}

/// Configuration as printed by `config show`.
#[derive(Serialize)]
struct ConfigView<'a> {
    email: &'a str,
    account_id: &'a str,
    location_id: &'a str,
    host: &'a str,
    password_stored: bool,
    polling: &'a PollingConfig,
    log_level: &'a str,
}

impl<'a> From<&'a Config> for ConfigView<'a> {
    fn from(config: &'a Config) -> Self {
        Self {
            email: &config.account.email,
            account_id: &config.account.account_id,
            location_id: &config.account.location_id,
            host: &config.account.host,
            password_stored: config.account.password.is_some(),
            polling: &config.polling,
            log_level: &config.log_level,
        }
    }
}

fn show_config(cli: &Cli, config: Result<Config, StoreError>) -> Result<()> {
    let config = require_config(config)?;
    let view = ConfigView::from(&config);

    match cli.format {
        OutputFormat::Text => {
            println!("SmartHub Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Email:       {}", view.email);
            println!("Account:     {}", view.account_id);
            println!("Location:    {}", view.location_id);
            println!("Host:        {}", view.host);
            println!(
                "Password:    {}",
                if view.password_stored {
                    "stored in file"
                } else {
                    "from environment"
                }
            );
            println!();
            println!("Interval:    {}s", config.polling.interval().as_secs());
            println!("Timeout:     {}s", config.polling.request_timeout_secs);
            println!(
                "Retries:     {} attempts, {}s apart",
                config.polling.max_attempts, config.polling.retry_delay_secs
            );
            println!("Log level:   {}", view.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&view)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_path = cli.config_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(args: &InitArgs, cli: &Cli) -> Result<()> {
    let path = cli.config_path();
    if path.exists() && !args.force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }

    let mut config = Config::new(AccountConfig {
        email: args.email.clone(),
        password: args.password.clone(),
        account_id: args.account_id.clone(),
        location_id: args.location_id.clone(),
        host: args.host.clone(),
    });
    if let Some(interval) = args.interval {
        config.polling.interval_secs = interval;
    }

    config.save_to(&path).await?;

    if cli.format == OutputFormat::Text {
        println!("Wrote {}", path.display());
        if config.account.password.is_none() {
            println!("Set {PASSWORD_ENV} before running other commands.");
        }
    }

    Ok(())
}
