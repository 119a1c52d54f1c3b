//! ShareSync CLI - Command-line interface for ShareSync
//!
//! Provides commands for:
//! - Checking which system tools are installed
//! - Previewing the mirror passes a run would perform
//! - Listing the contents of either endpoint
//! - Running a sync between the share and the transfer endpoint

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sharesync_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{list::ListCommand, plan::PlanCommand, probe::ProbeCommand, run::RunCommand};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "sharesync",
    version,
    about = "Mirror a network share with an FTP or SFTP server"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report which required system tools are installed
    Probe(ProbeCommand),
    /// Show the mirror passes a run would perform, without running them
    Plan(PlanCommand),
    /// Connect one endpoint and list its entries
    List(ListCommand),
    /// Connect both endpoints and run a sync to completion
    Run(RunCommand),
}

/// Loads the config file, falling back to defaults when none exists
///
/// An explicitly named file must exist; the default location may be absent.
fn load_config(explicit: Option<&PathBuf>) -> Result<Config> {
    let path = explicit.cloned().unwrap_or_else(Config::default_path);
    if explicit.is_none() && !path.exists() {
        return Ok(Config::default());
    }
    Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    // Setup tracing
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Probe(cmd) => cmd.execute(&config, format).await,
        Commands::Plan(cmd) => cmd.execute(&config, format).await,
        Commands::List(cmd) => cmd.execute(&config, format).await,
        Commands::Run(cmd) => cmd.execute(&config, format).await,
    }
}
