//! Application configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/humora/config.toml` by default. Every section is optional:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8000"
//! paths = ["/ws/analyze", "/ws"]
//! max_connections = 100
//! error_replies = false
//! allowed_origins = []          # empty: any origin
//!
//! [analyzer]
//! kind = "random"
//! min_age = 18
//! max_age = 60
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use humora_core::{LabelSet, TracingOutputFormat};
use humora_protocol::{MAX_IMAGE_DIMENSION, MAX_PAYLOAD_SIZE};
use humora_server::{CorsPolicy, DEFAULT_BIND_ADDR, DEFAULT_WS_PATHS, ServerConfig};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::{CliError, CliResult};

// ---------------------------------------------------------------------------
// AppConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the humora binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener and session settings.
    pub server: ServerSettings,

    /// Which analyzer to run and its labels.
    pub analyzer: AnalyzerSettings,

    /// Log level and format.
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from the default location, or defaults when the
    /// file does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("humora")
    }

    /// Checks every section without starting anything.
    pub fn validate(&self) -> CliResult<()> {
        self.server.to_server_config()?.validate()?;
        self.analyzer.validate()?;
        self.logging.level()?;
        self.logging.format()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ServerSettings
// ---------------------------------------------------------------------------

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address.
    pub bind: String,

    /// WebSocket routes.
    pub paths: Vec<String>,

    /// Maximum concurrent sessions.
    pub max_connections: usize,

    /// Largest WebSocket message in bytes; larger ones end the session.
    pub max_message_size: usize,

    /// Largest image payload in bytes; larger frames are skipped.
    pub max_payload_size: usize,

    /// Largest decoded frame in pixels; larger frames are skipped.
    pub max_image_width: u32,
    pub max_image_height: u32,

    /// Close sessions silent for this many seconds.
    pub idle_timeout_secs: Option<u64>,

    /// Skip frames whose analysis takes longer than this.
    pub analyze_timeout_ms: Option<u64>,

    /// Answer skipped frames with `{"error": ...}`.
    pub error_replies: bool,

    /// Origins allowed by CORS. Empty allows any origin.
    pub allowed_origins: Vec<String>,

    /// Seconds shutdown waits for sessions to close.
    pub shutdown_grace_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        let defaults = ServerConfig::default();
        Self {
            bind: DEFAULT_BIND_ADDR.to_string(),
            paths: DEFAULT_WS_PATHS.iter().map(|p| p.to_string()).collect(),
            max_connections: defaults.max_connections,
            max_message_size: defaults.max_message_size,
            max_payload_size: MAX_PAYLOAD_SIZE,
            max_image_width: MAX_IMAGE_DIMENSION,
            max_image_height: MAX_IMAGE_DIMENSION,
            idle_timeout_secs: None,
            analyze_timeout_ms: None,
            error_replies: false,
            allowed_origins: Vec::new(),
            shutdown_grace_secs: defaults.shutdown_grace.as_secs(),
        }
    }
}

impl ServerSettings {
    /// Parses the listen address.
    pub fn bind_addr(&self) -> CliResult<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| CliError::Config(format!("server.bind '{}': {}", self.bind, e)))
    }

    /// Builds the server configuration. Limits are checked by the server
    /// when it starts, or by [`AppConfig::validate`].
    pub fn to_server_config(&self) -> CliResult<ServerConfig> {
        let cors = if self.allowed_origins.is_empty() {
            CorsPolicy::Permissive
        } else {
            CorsPolicy::AllowList(self.allowed_origins.clone())
        };

        let mut config = ServerConfig::new(self.bind_addr()?)
            .with_ws_paths(self.paths.iter().cloned())
            .with_max_connections(self.max_connections)
            .with_max_message_size(self.max_message_size)
            .with_max_payload_size(self.max_payload_size)
            .with_max_image_dimensions(self.max_image_width, self.max_image_height)
            .with_error_replies(self.error_replies)
            .with_cors(cors)
            .with_shutdown_grace(Duration::from_secs(self.shutdown_grace_secs));

        if let Some(secs) = self.idle_timeout_secs {
            config = config.with_idle_timeout(Duration::from_secs(secs));
        }
        if let Some(ms) = self.analyze_timeout_ms {
            config = config.with_analyze_timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// AnalyzerSettings
// ---------------------------------------------------------------------------

/// Available analyzer implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    /// Uniformly random labels.
    #[default]
    Random,
}

/// `[analyzer]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub kind: AnalyzerKind,

    /// Simulated processing time per frame, in milliseconds.
    pub latency_ms: u64,

    /// Emotion and gender labels, age range.
    #[serde(flatten)]
    pub labels: LabelSet,
}

impl AnalyzerSettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn validate(&self) -> CliResult<()> {
        self.labels
            .validate()
            .map_err(|e| CliError::Config(format!("analyzer labels: {}", e)))
    }
}

// ---------------------------------------------------------------------------
// LoggingSettings
// ---------------------------------------------------------------------------

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// trace, debug, info, warn or error.
    pub level: String,

    /// pretty, compact or json.
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: TracingOutputFormat::default().to_string(),
        }
    }
}

impl LoggingSettings {
    pub fn level(&self) -> CliResult<Level> {
        self.level
            .parse()
            .map_err(|_| CliError::Config(format!("logging.level '{}' is not a level", self.level)))
    }

    pub fn format(&self) -> CliResult<TracingOutputFormat> {
        self.format
            .parse()
            .map_err(|e| CliError::Config(format!("logging.format: {}", e)))
    }
}
