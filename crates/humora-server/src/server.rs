//! HTTP and WebSocket front end.
//!
//! Routes every configured WebSocket path to a [`Session`], serves
//! `/health`, applies the CORS policy and enforces the connection limit.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use humora_analyzer::Analyzer;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, broadcast};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::config::{HEALTH_PATH, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::session::{Session, SessionContext, SessionReport};
use crate::signals::ShutdownHandle;
use crate::transport::WsTransport;

/// Buffered session reports per subscriber.
const REPORT_CAPACITY: usize = 64;

/// Shared application state passed to axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    analyzer: Arc<dyn Analyzer>,
    limiter: Arc<Semaphore>,
    shutdown: ShutdownHandle,
    reports: broadcast::Sender<SessionReport>,
    cors: CorsLayer,
}

impl AppState {
    /// Validates the configuration and builds the state.
    pub fn new(config: ServerConfig, analyzer: Arc<dyn Analyzer>) -> ServerResult<Self> {
        config.validate()?;
        let cors = config.cors.layer()?;
        let (reports, _) = broadcast::channel(REPORT_CAPACITY);

        Ok(Self {
            limiter: Arc::new(Semaphore::new(config.max_connections)),
            config: Arc::new(config),
            analyzer,
            shutdown: ShutdownHandle::new(),
            reports,
            cors,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of sessions currently holding a connection slot.
    pub fn active_sessions(&self) -> usize {
        self.config
            .max_connections
            .saturating_sub(self.limiter.available_permits())
    }

    /// Context for a new session: shared analyzer, server settings and the
    /// server-wide shutdown channel.
    pub fn session_context(&self) -> SessionContext {
        SessionContext::new(Arc::clone(&self.analyzer))
            .with_settings(self.config.session_settings())
            .with_shutdown(self.shutdown.clone())
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Subscribes to end-of-session reports.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionReport> {
        self.reports.subscribe()
    }

    /// Waits for every session to release its slot, up to the grace period.
    async fn drain(&self) {
        let active = self.active_sessions();
        if active == 0 {
            return;
        }

        info!(active, "Waiting for sessions to close");
        let all = u32::try_from(self.config.max_connections).unwrap_or(u32::MAX);
        let permits = Arc::clone(&self.limiter).acquire_many_owned(all);

        match tokio::time::timeout(self.config.shutdown_grace, permits).await {
            Ok(Ok(_permits)) => info!("All sessions closed"),
            Ok(Err(_)) => debug!("Connection limiter closed"),
            Err(_) => warn!(
                remaining = self.active_sessions(),
                grace_ms = self.config.shutdown_grace.as_millis() as u64,
                "Shutdown grace period elapsed with sessions still open"
            ),
        }
    }
}

/// Builds the axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route(HEALTH_PATH, get(health_handler));
    for path in state.config.ws_paths.iter() {
        router = router.route(path, get(ws_handler));
    }

    let cors = state.cors.clone();
    router.with_state(state).layer(cors)
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    if state.shutdown.is_shutdown() {
        return (StatusCode::SERVICE_UNAVAILABLE, "shutting down").into_response();
    }

    let Ok(permit) = Arc::clone(&state.limiter).try_acquire_owned() else {
        warn!(
            max_connections = state.config.max_connections,
            "Connection limit reached, refusing upgrade"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "too many connections").into_response();
    };

    // Browsers send each message as one frame
    ws.max_message_size(state.config.max_message_size)
        .max_frame_size(state.config.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, permit))
}

/// Runs one session on an upgraded socket.
async fn handle_socket(socket: WebSocket, state: AppState, permit: OwnedSemaphorePermit) {
    let mut session = match Session::accept(WsTransport::new(socket), state.session_context()) {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Failed to start session");
            return;
        }
    };

    let outcome = session.run().await;

    // Release the slot before announcing the end of the session
    drop(permit);
    let _ = state.reports.send(session.report(outcome));
}

/// Health check endpoint.
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let status = if state.shutdown.is_shutdown() {
        "shutting_down"
    } else {
        "ok"
    };

    Json(json!({
        "status": status,
        "active_sessions": state.active_sessions(),
        "analyzer": state.analyzer.name(),
    }))
}

/// The frame-analysis server: a bound listener plus shared state.
pub struct AnalyzeServer {
    listener: TcpListener,
    state: AppState,
}

impl AnalyzeServer {
    /// Validates the configuration and binds the listen address.
    pub async fn bind(config: ServerConfig, analyzer: Arc<dyn Analyzer>) -> ServerResult<Self> {
        let addr = config.bind_addr;
        let state = AppState::new(config, analyzer)?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::bind(addr.to_string(), e))?;

        info!(
            addr = %listener.local_addr()?,
            paths = ?state.config.ws_paths,
            analyzer = state.analyzer.name(),
            max_connections = state.config.max_connections,
            "Analyze server listening"
        );

        Ok(Self { listener, state })
    }

    /// Returns the bound address (useful when binding port 0).
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle that shuts the server down when triggered.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.state.shutdown_handle()
    }

    /// Subscribes to end-of-session reports.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionReport> {
        self.state.subscribe()
    }

    /// Serves until `shutdown` completes or the shutdown handle is triggered.
    ///
    /// Live sessions are then told to close, and the call returns once they
    /// have, or when the grace period runs out.
    pub async fn run_until_shutdown<S>(self, shutdown: S) -> ServerResult<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let Self { listener, state } = self;
        let router = build_router(state.clone());

        let trigger = state.shutdown_handle();
        let graceful = async move {
            tokio::select! {
                () = shutdown => info!("Shutdown signal received"),
                () = trigger.wait().wait() => info!("Shutdown triggered"),
            }
            trigger.trigger();
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(graceful)
            .await?;

        state.drain().await;
        info!("Analyze server stopped");
        Ok(())
    }
}
