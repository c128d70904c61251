//! humora command-line interface
//!
//! This crate provides the `humora` binary: it runs the frame-analysis
//! server, probes a running deployment and manages the configuration file.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::AppConfig;
pub use error::{CliError, CliResult};
