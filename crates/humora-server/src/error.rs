//! Server error types.

use std::io;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (listener, accept, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Could not bind the listen address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The transport was closed before the session started.
    #[error("Transport is already closed")]
    TransportClosed,
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a bind error.
    pub fn bind(addr: impl Into<String>, source: io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}

/// Transport-fatal errors. Any of these ends the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Reading the next message failed (reset, protocol violation, ...).
    #[error("receive failed: {0}")]
    Receive(String),

    /// Sending a message failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Operation on a transport that is already closed.
    #[error("transport closed")]
    Closed,
}

impl TransportError {
    pub fn receive(cause: impl ToString) -> Self {
        Self::Receive(cause.to_string())
    }

    pub fn send(cause: impl ToString) -> Self {
        Self::Send(cause.to_string())
    }
}
