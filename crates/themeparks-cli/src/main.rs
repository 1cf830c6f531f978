//! themeparks CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use themeparks_core::init_tracing;

use themeparks_cli::cli::{Cli, Command, ConfigAction};
use themeparks_cli::commands;
use themeparks_cli::config::CliConfig;
use themeparks_cli::error::CliResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);
    let config = match cli.config {
        Some(ref path) => CliConfig::load_from(path)?,
        None => CliConfig::load()?,
    };

    init_tracing(config.logging.tracing_config(cli.debug)?)?;

    match cli.command {
        Command::WaitTimes { feed, json } => {
            let out = commands::park::wait_times(&config.settings, &feed, json).await?;
            println!("{}", out.trim_end());
            Ok(())
        }
        Command::OpeningTimes { feed, days, json } => {
            let out =
                commands::park::opening_times(&config.settings, &feed, days, json).await?;
            println!("{}", out.trim_end());
            Ok(())
        }
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
