//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use humora_core::TracingOutputFormat;

/// Default endpoint for `humora probe`.
pub const DEFAULT_PROBE_URL: &str = "ws://127.0.0.1:8000/ws/analyze";

/// humora - frame analysis backend for video meetings
#[derive(Debug, Parser)]
#[command(name = "humora")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "HUMORA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log format: pretty, compact or json
    #[arg(long, global = true)]
    pub log_format: Option<TracingOutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the analysis server in the foreground
    Serve(ServeArgs),

    /// Send test frames to a running server and print the replies
    Probe(ProbeArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for `humora serve`.
#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind`)
    #[arg(long, short)]
    pub bind: Option<SocketAddr>,

    /// Maximum concurrent sessions (overrides `server.max_connections`)
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Answer skipped frames with an error message instead of silence
    #[arg(long)]
    pub error_replies: bool,
}

/// Options for `humora probe`.
#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// WebSocket endpoint of the server
    #[arg(long, short, default_value = DEFAULT_PROBE_URL)]
    pub url: String,

    /// JPEG or PNG file to send (a generated test card otherwise)
    #[arg(long, short)]
    pub image: Option<PathBuf>,

    /// Number of frames to send
    #[arg(long, short = 'n', default_value = "1")]
    pub count: u32,

    /// Seconds to wait for each reply
    #[arg(long, default_value = "5")]
    pub timeout: u64,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
