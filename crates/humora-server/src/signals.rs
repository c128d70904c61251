//! Shutdown signalling.
//!
//! One watch channel carries the shutdown flag. [`SignalHandler`] flips it
//! on SIGTERM or SIGINT (Ctrl+C on other platforms). The server and every
//! live session hold a [`ShutdownHandle`] on the same channel and wait on
//! it next to their own work.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

/// Turns process signals into a server shutdown.
#[derive(Debug, Default)]
pub struct SignalHandler {
    handle: ShutdownHandle,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns the task that waits for a signal.
    ///
    /// Call once at startup, from inside the runtime.
    pub fn spawn_listener(&self) {
        let handle = self.handle.clone();

        tokio::spawn(async move {
            if let Some(name) = wait_for_signal().await {
                info!(signal = name, "Received signal, initiating shutdown");
                handle.trigger();
            }
        });
    }

    /// Future that completes once a signal arrived.
    pub fn shutdown(&self) -> ShutdownSignal {
        self.handle.wait()
    }

    /// Handle sharing this handler's channel.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> Option<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut term), Ok(mut int)) => tokio::select! {
            _ = term.recv() => Some("SIGTERM"),
            _ = int.recv() => Some("SIGINT"),
        },
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Failed to install signal handlers, falling back to Ctrl+C");
            ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Option<&'static str> {
    ctrl_c().await
}

async fn ctrl_c() -> Option<&'static str> {
    match tokio::signal::ctrl_c().await {
        Ok(()) => Some("Ctrl+C"),
        Err(e) => {
            error!(error = %e, "Cannot listen for Ctrl+C, shutdown only on request");
            None
        }
    }
}

/// Completes when shutdown is triggered.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Waits for the flag.
    ///
    /// Also returns once every handle is gone, since nothing can trigger
    /// shutdown any more.
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|&down| down).await;
    }
}

/// Triggers or observes shutdown. Clones share one flag.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    /// Creates a handle on a fresh channel, not tied to process signals.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Sets the flag. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }

    /// Future that completes once the flag is set.
    pub fn wait(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl std::fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("is_shutdown", &self.is_shutdown())
            .finish()
    }
}
