//! Composer buildpack
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use composer_buildpack::cli::{Cli, Commands, LogFormat};
use composer_buildpack::config::ConfigManager;
use composer_buildpack::error::BuildpackResult;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> BuildpackResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load()?;

    let log_format = cli
        .log_format
        .unwrap_or_else(|| LogFormat::from_config(&config.general.log_format));
    init_logging(cli.verbose, log_format);
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Retrieve(args) => composer_buildpack::cli::commands::retrieve(args, &config),
        Commands::Build(args) => composer_buildpack::cli::commands::build(args, &config),
        Commands::Catalog(args) => composer_buildpack::cli::commands::catalog(args, &config),
    }
}

/// 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins when set
fn init_logging(verbose: u8, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("composer_buildpack=warn"),
        1 => EnvFilter::new("composer_buildpack=info"),
        _ => EnvFilter::new("composer_buildpack=debug"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.without_time().init(),
    }
}
