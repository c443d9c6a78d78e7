#![warn(clippy::all)]
#![allow(clippy::pedantic)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stockrank_common::logging::init_logging_with_exclusions;
use stockrank_common::Validate;

mod config;
mod rebalance;
mod screen;

use config::AppConfig;

/// `stockrank` - multi-criteria stock screening and portfolio construction.
#[derive(Parser, Debug)]
#[command(name = "stockrank")]
#[command(version = "0.1.0")]
#[command(about = "Score a stock universe, build a weighted portfolio, and track rebalance cadence.", long_about = None)]
struct Cli {
    /// Config file (default: ~/.stockrank/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score the universe and build a weighted portfolio
    Screen(screen::ScreenArgs),

    /// Show rebalance cadence and advice
    Rebalance(rebalance::RebalanceArgs),

    /// Print the scoring checklist
    Criteria,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Command failed");
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<stockrank_common::Error>()
                .map_or(1, stockrank_common::Error::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    match cli.command {
        Commands::Screen(args) => {
            args.apply(&mut config);
            validate(&config)?;
            screen::run(&config, &args)
        }
        Commands::Rebalance(args) => {
            args.apply(&mut config);
            validate(&config)?;
            rebalance::run(&config, &args)
        }
        Commands::Criteria => {
            print!("{}", screen::criteria_table());
            Ok(())
        }
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    config
        .validate()
        .map_err(stockrank_common::Error::from)
        .context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_screen_flags() {
        let cli = Cli::try_parse_from([
            "stockrank", "screen", "--size", "5", "--sector", "IT,Banking", "--format", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Screen(args) => {
                assert_eq!(args.size, Some(5));
                assert_eq!(args.sector, vec!["IT".to_string(), "Banking".to_string()]);
                assert_eq!(args.format.as_deref(), Some("json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_validation_error_exit_code() {
        let mut config = AppConfig::default();
        config.screener.portfolio_size = 99;
        let err = validate(&config).unwrap_err();
        let code = err
            .downcast_ref::<stockrank_common::Error>()
            .map(stockrank_common::Error::exit_code);
        assert_eq!(code, Some(78));
    }
}
