//! Server configuration.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::http::HeaderValue;
use humora_protocol::{DecodeLimits, MAX_IMAGE_DIMENSION, MAX_PAYLOAD_SIZE};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::error::{ServerError, ServerResult};
use crate::session::SessionSettings;

/// Listen on every interface, so that browsers on other hosts can connect.
pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8000);

/// WebSocket routes served by default. `/ws` is what the web frontend dials.
pub const DEFAULT_WS_PATHS: &[&str] = &["/ws/analyze", "/ws"];

pub(crate) const HEALTH_PATH: &str = "/health";

/// Cross-origin policy applied to every route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin, any method, any header.
    #[default]
    Permissive,
    /// Only the listed origins.
    AllowList(Vec<String>),
}

impl CorsPolicy {
    /// Builds the tower-http layer for this policy.
    pub fn layer(&self) -> ServerResult<CorsLayer> {
        match self {
            Self::Permissive => Ok(CorsLayer::permissive()),
            Self::AllowList(origins) => {
                let origins = origins
                    .iter()
                    .map(|origin| {
                        if origin.trim() == "*" {
                            return Err(ServerError::config(
                                "wildcard origin in allow list, use the permissive policy instead",
                            ));
                        }
                        HeaderValue::from_str(origin).map_err(|_| {
                            ServerError::config(format!("invalid CORS origin: {origin}"))
                        })
                    })
                    .collect::<ServerResult<Vec<_>>>()?;

                Ok(CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any))
            }
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Routes that accept WebSocket upgrades.
    pub ws_paths: Vec<String>,

    /// Maximum concurrent sessions. Further upgrades get 503.
    pub max_connections: usize,

    /// Largest WebSocket message, and single frame, accepted by the
    /// transport. Exceeding it ends the session. Must not be below
    /// `max_payload_size`.
    pub max_message_size: usize,

    /// Largest image payload the session will decode. Larger frames are
    /// skipped.
    pub max_payload_size: usize,

    /// Largest decoded frame, in pixels. Larger frames are skipped.
    pub max_image_width: u32,
    pub max_image_height: u32,

    /// Close sessions that stay silent this long.
    pub idle_timeout: Option<Duration>,

    /// Skip frames whose analysis takes longer than this.
    pub analyze_timeout: Option<Duration>,

    /// Answer skipped frames with `{"error": ...}` instead of silence.
    pub error_replies: bool,

    /// Cross-origin policy.
    pub cors: CorsPolicy,

    /// How long shutdown waits for sessions to close.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            ws_paths: DEFAULT_WS_PATHS.iter().map(|p| p.to_string()).collect(),
            max_connections: 100,
            max_message_size: 4 * MAX_PAYLOAD_SIZE,
            max_payload_size: MAX_PAYLOAD_SIZE,
            max_image_width: MAX_IMAGE_DIMENSION,
            max_image_height: MAX_IMAGE_DIMENSION,
            idle_timeout: None,
            analyze_timeout: None,
            error_replies: false,
            cors: CorsPolicy::Permissive,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration listening on the given address.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Builder: set WebSocket routes.
    pub fn with_ws_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ws_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set max connections.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Builder: set the transport message limit.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Builder: set the decodable payload limit.
    pub fn with_max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Builder: set the largest decoded frame.
    pub fn with_max_image_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_image_width = width;
        self.max_image_height = height;
        self
    }

    /// Builder: set idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Builder: set per-frame analysis timeout.
    pub fn with_analyze_timeout(mut self, timeout: Duration) -> Self {
        self.analyze_timeout = Some(timeout);
        self
    }

    /// Builder: enable or disable error replies.
    pub fn with_error_replies(mut self, enabled: bool) -> Self {
        self.error_replies = enabled;
        self
    }

    /// Builder: set CORS policy.
    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    /// Builder: set shutdown grace period.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Checks the configuration before binding.
    ///
    /// The router panics on malformed or duplicate routes, so every path is
    /// checked here first.
    pub fn validate(&self) -> ServerResult<()> {
        if self.ws_paths.is_empty() {
            return Err(ServerError::config("at least one WebSocket path is required"));
        }

        let mut seen = HashSet::new();
        for path in &self.ws_paths {
            if !path.starts_with('/') {
                return Err(ServerError::config(format!(
                    "WebSocket path must start with '/': {path}"
                )));
            }
            if path.contains(['{', '}', '*', ':']) {
                return Err(ServerError::config(format!(
                    "WebSocket path must be a literal route: {path}"
                )));
            }
            if path == HEALTH_PATH {
                return Err(ServerError::config(format!(
                    "WebSocket path {path} collides with the health route"
                )));
            }
            if !seen.insert(path.as_str()) {
                return Err(ServerError::config(format!(
                    "duplicate WebSocket path: {path}"
                )));
            }
        }

        if self.max_connections == 0 {
            return Err(ServerError::config("max_connections must be at least 1"));
        }
        if self.max_connections > u32::MAX as usize {
            return Err(ServerError::config("max_connections is too large"));
        }
        if self.max_payload_size == 0 || self.max_message_size == 0 {
            return Err(ServerError::config("message size limits must be non-zero"));
        }
        if self.max_message_size < self.max_payload_size {
            return Err(ServerError::config(format!(
                "max_message_size ({}) must be at least max_payload_size ({})",
                self.max_message_size, self.max_payload_size
            )));
        }
        if self.max_image_width == 0 || self.max_image_height == 0 {
            return Err(ServerError::config("image dimension limits must be non-zero"));
        }
        if self.idle_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ServerError::config("idle_timeout must be non-zero"));
        }
        if self.analyze_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ServerError::config("analyze_timeout must be non-zero"));
        }

        let _ = self.cors.layer()?;
        Ok(())
    }

    /// Per-session settings derived from this configuration.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            decode_limits: DecodeLimits::default()
                .with_max_payload_size(self.max_payload_size)
                .with_max_dimensions(self.max_image_width, self.max_image_height),
            idle_timeout: self.idle_timeout,
            analyze_timeout: self.analyze_timeout,
            error_replies: self.error_replies,
        }
    }
}
