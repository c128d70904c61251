//! humora CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use humora_core::{TracingConfig, init_tracing};

use humora_cli::cli::{Cli, Command, ConfigAction};
use humora_cli::commands;
use humora_cli::config::AppConfig;
use humora_cli::error::CliResult;

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
    // Load configuration
    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    init_tracing(tracing_config(&cli, &config)?)?;

    match cli.command {
        Command::Serve(ref args) => commands::serve::run(args, &config).await,
        Command::Probe(ref args) => commands::probe::run(args).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}

/// `--debug` and `--log-format` win over the `[logging]` section.
fn tracing_config(cli: &Cli, config: &AppConfig) -> CliResult<TracingConfig> {
    let base = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default().with_level(config.logging.level()?)
    };

    let format = match cli.log_format {
        Some(format) => format,
        None => config.logging.format()?,
    };
    Ok(base.with_format(format))
}
