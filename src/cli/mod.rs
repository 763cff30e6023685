//! CLI interface for alpaca-daily
//!
//! Provides subcommands for:
//! - `check`: Broker connectivity smoke test (no orders)
//! - `run`: Sync data, build signals, optionally place paper trades
//! - `status`: Show local store state
//! - `config`: Show current configuration

mod check;
mod run;

pub use check::CheckArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "alpaca-daily")]
#[command(about = "Daily-bar forecast trading bot for Alpaca paper accounts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Smoke test the broker connection (no orders)
    Check(CheckArgs),
    /// Run the sync / signal / trade pipeline
    Run(RunArgs),
    /// Show local store state
    Status,
    /// Show current configuration
    Config,
}
