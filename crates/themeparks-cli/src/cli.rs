//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// themeparks - Wait times and opening hours from a park feed
#[derive(Debug, Parser)]
#[command(name = "themeparks")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "THEMEPARKS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current ride wait times
    WaitTimes {
        /// Path to the park's JSON feed
        #[arg(long, short)]
        feed: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show upcoming opening times
    OpeningTimes {
        /// Path to the park's JSON feed
        #[arg(long, short)]
        feed: PathBuf,

        /// Number of days to show after today (overrides `schedule_days`)
        #[arg(long, short)]
        days: Option<u32>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
