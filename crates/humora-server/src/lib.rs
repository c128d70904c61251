//! WebSocket frame-analysis server.
//!
//! This crate provides the humora server that handles:
//! - One [`Session`] per WebSocket connection, running the
//!   receive → decode → analyze → respond loop
//! - Failure isolation: a bad frame is skipped, the connection stays open
//! - The axum router (WebSocket routes, `/health`, CORS)
//! - Connection limits and graceful shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use humora_analyzer::RandomAnalyzer;
//! use humora_core::LabelSet;
//! use humora_server::{AnalyzeServer, ServerConfig, SignalHandler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = Arc::new(RandomAnalyzer::new(LabelSet::default())?);
//!     let server = AnalyzeServer::bind(ServerConfig::default(), analyzer).await?;
//!
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener();
//!     server.run_until_shutdown(signals.shutdown().wait()).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod server;
mod session;
mod signals;
mod transport;

#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod test_support;

pub use config::{CorsPolicy, DEFAULT_BIND_ADDR, DEFAULT_WS_PATHS, ServerConfig};
pub use error::{ServerError, ServerResult, TransportError, TransportResult};
pub use server::{AnalyzeServer, AppState, build_router};
pub use session::{
    Session, SessionContext, SessionId, SessionOutcome, SessionReport, SessionSettings,
    SessionStats,
};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
pub use transport::{Transport, WireMessage, WsTransport};
