//! CLI, config file and output rendering
//!
//! This crate provides the `themeparks` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
