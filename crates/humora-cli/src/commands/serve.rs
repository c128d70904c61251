//! Foreground server command.

use std::sync::Arc;

use humora_analyzer::{Analyzer, RandomAnalyzer};
use humora_server::{AnalyzeServer, ServerConfig, SignalHandler};
use tracing::info;

use crate::cli::ServeArgs;
use crate::config::{AnalyzerKind, AnalyzerSettings, AppConfig};
use crate::error::CliResult;

/// Builds the configured analyzer.
pub fn build_analyzer(settings: &AnalyzerSettings) -> CliResult<Arc<dyn Analyzer>> {
    match settings.kind {
        AnalyzerKind::Random => {
            let analyzer =
                RandomAnalyzer::new(settings.labels.clone())?.with_latency(settings.latency());
            Ok(Arc::new(analyzer))
        }
    }
}

/// Applies command-line overrides on top of the file configuration.
pub fn server_config(args: &ServeArgs, config: &AppConfig) -> CliResult<ServerConfig> {
    let mut server = config.server.to_server_config()?;
    if let Some(bind) = args.bind {
        server.bind_addr = bind;
    }
    if let Some(max) = args.max_connections {
        server = server.with_max_connections(max);
    }
    if args.error_replies {
        server = server.with_error_replies(true);
    }
    Ok(server)
}

/// Runs the server until SIGINT or SIGTERM.
pub async fn run(args: &ServeArgs, config: &AppConfig) -> CliResult<()> {
    let server_config = server_config(args, config)?;
    let analyzer = build_analyzer(&config.analyzer)?;

    let signal_handler = SignalHandler::new();
    signal_handler.spawn_listener();

    let server = AnalyzeServer::bind(server_config, analyzer).await?;
    server
        .run_until_shutdown(signal_handler.shutdown().wait())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn builds_random_analyzer() {
        let analyzer = build_analyzer(&AnalyzerSettings::default()).unwrap();
        assert_eq!(analyzer.name(), "random");
    }

    #[test]
    fn rejects_invalid_labels() {
        let mut settings = AnalyzerSettings::default();
        settings.labels.genders.clear();

        let result = build_analyzer(&settings);
        assert!(matches!(result, Err(CliError::Analyzer(_))));
    }

    #[test]
    fn flags_override_file() {
        let mut config = AppConfig::default();
        config.server.max_connections = 10;

        let args = ServeArgs {
            bind: Some("127.0.0.1:7000".parse().unwrap()),
            max_connections: Some(2),
            error_replies: true,
        };
        let server = server_config(&args, &config).unwrap();

        assert_eq!(server.bind_addr.port(), 7000);
        assert_eq!(server.max_connections, 2);
        assert!(server.error_replies);
    }

    #[test]
    fn file_values_without_flags() {
        let mut config = AppConfig::default();
        config.server.max_connections = 10;
        config.server.error_replies = true;

        let server = server_config(&ServeArgs::default(), &config).unwrap();

        assert_eq!(server.bind_addr.port(), 8000);
        assert_eq!(server.max_connections, 10);
        assert!(server.error_replies);
    }
}
