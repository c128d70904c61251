//! CLI error types.

use std::fmt;

use humora_analyzer::AnalyzerError;
use humora_core::TracingError;
use humora_protocol::ProtocolError;
use humora_server::ServerError;
use tokio_tungstenite::tungstenite;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// IO error.
    Io(std::io::Error),
    /// Logging could not be set up.
    Tracing(TracingError),
    /// Analyzer could not be built.
    Analyzer(AnalyzerError),
    /// Server failed to start or stopped with an error.
    Server(ServerError),
    /// Connection to a server failed.
    Connection(String),
    /// Payload could not be prepared or the reply was not understood.
    Protocol(String),
    /// Request timed out.
    Timeout(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Tracing(err) => write!(f, "logging setup failed: {}", err),
            Self::Analyzer(err) => write!(f, "analyzer error: {}", err),
            Self::Server(err) => write!(f, "server error: {}", err),
            Self::Connection(msg) => write!(f, "connection error: {}", msg),
            Self::Protocol(msg) => write!(f, "protocol error: {}", msg),
            Self::Timeout(msg) => write!(f, "timeout: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Tracing(err) => Some(err),
            Self::Analyzer(err) => Some(err),
            Self::Server(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<TracingError> for CliError {
    fn from(err: TracingError) -> Self {
        Self::Tracing(err)
    }
}

impl From<AnalyzerError> for CliError {
    fn from(err: AnalyzerError) -> Self {
        Self::Analyzer(err)
    }
}

impl From<ServerError> for CliError {
    fn from(err: ServerError) -> Self {
        Self::Server(err)
    }
}

impl From<ProtocolError> for CliError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<tungstenite::Error> for CliError {
    fn from(err: tungstenite::Error) -> Self {
        Self::Connection(err.to_string())
    }
}
