//! Error types for analyzer operations.

use std::fmt;
use thiserror::Error;

/// The category of an analyzer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzerErrorCode {
    /// The frame could not be analyzed (no face, unsupported size, ...).
    InvalidFrame,
    /// The backing model is not loaded or not reachable.
    Unavailable,
    /// Analysis did not finish in time.
    Timeout,
    /// The analyzer was built with an invalid configuration.
    Configuration,
    /// Unexpected internal state.
    Internal,
}

impl AnalyzerErrorCode {
    /// Returns a stable snake_case name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFrame => "invalid_frame",
            Self::Unavailable => "unavailable",
            Self::Timeout => "timeout",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for AnalyzerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error returned by an [`Analyzer`](crate::Analyzer).
///
/// Sessions treat every analyzer error as recoverable: the frame is skipped
/// and the connection stays open.
#[derive(Debug, Error)]
pub struct AnalyzerError {
    code: AnalyzerErrorCode,
    message: String,
    /// Name of the analyzer that failed.
    analyzer: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AnalyzerError {
    /// Creates a new analyzer error with the given code and message.
    pub fn new(code: AnalyzerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            analyzer: None,
            source: None,
        }
    }

    /// Creates an invalid frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::new(AnalyzerErrorCode::InvalidFrame, message)
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(AnalyzerErrorCode::Unavailable, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(AnalyzerErrorCode::Timeout, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AnalyzerErrorCode::Configuration, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AnalyzerErrorCode::Internal, message)
    }

    /// Sets the analyzer name for this error.
    pub fn with_analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> AnalyzerErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn analyzer(&self) -> Option<&str> {
        self.analyzer.as_deref()
    }
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref analyzer) = self.analyzer {
            write!(f, "[{}] ", analyzer)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
