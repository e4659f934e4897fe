//! Live preview server with push updates via Server-Sent Events.
//!
//! Serves the configured root over HTTP and relays preview commands
//! (navigate, reload, body updates, highlights) to every connected browser.

mod routes;
mod state;

pub use routes::{CLIENT_PATH, SSE_PATH};
pub use state::{PreviewEvent, PreviewState, SharedState};

use crate::error::{Result, SyncError};
use crate::host::{relative_path, Position, PreviewServer, ServerInfo, StartOptions};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Ports tried after the configured one when it is taken.
const PORT_FALLBACKS: u16 = 10;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

struct Running {
    state: SharedState,
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// [`PreviewServer`] backed by an axum HTTP server.
#[derive(Default)]
pub struct SsePreviewServer {
    running: Mutex<Option<Running>>,
    log: Option<mpsc::UnboundedSender<Value>>,
}

impl SsePreviewServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send server log lines (`{"msg": ...}`) to `log`.
    pub fn with_log(mut self, log: mpsc::UnboundedSender<Value>) -> Self {
        self.log = Some(log);
        self
    }

    /// Address the server is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().as_ref().map(|r| r.addr)
    }

    fn with_state(&self, f: impl FnOnce(&PreviewState)) {
        let state = self.running.lock().as_ref().map(|r| Arc::clone(&r.state));
        match state {
            Some(state) => f(&state),
            None => tracing::debug!("Preview server not running, command dropped"),
        }
    }
}

/// URL path for an absolute file under the served directory.
fn url_path(state: &PreviewState, file: &str) -> Option<String> {
    relative_path(Path::new(file), &state.serve_dir)
        .map(|relative| routes::encode_url_path(&format!("/{}", relative)))
}

async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let mut last_error = None;

    for candidate in port..=port.saturating_add(PORT_FALLBACKS) {
        match TcpListener::bind((host, candidate)).await {
            Ok(listener) => {
                if candidate != port {
                    tracing::info!("Port {} is in use, using {}", port, candidate);
                }
                return Ok(listener);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(SyncError::Server(format!(
        "Failed to bind to {}:{}-{}: {}\n\nHint: Free one of these ports or set \"port\" in the config",
        host,
        port,
        port.saturating_add(PORT_FALLBACKS),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

#[async_trait]
impl PreviewServer for SsePreviewServer {
    async fn start(&self, options: StartOptions) -> Result<ServerInfo> {
        if self.is_running() {
            return Err(SyncError::Server("Preview server is already running".to_string()));
        }

        let serve_dir = options.serve_dir();
        let listener = bind(&options.config.host, options.config.port).await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(PreviewState::new(
            serve_dir.clone(),
            options.inject_body,
            self.log.clone(),
        ));
        let app = routes::router(Arc::clone(&state));

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                tracing::warn!("Preview server error: {}", e);
            }
        });

        let open_url = format!(
            "http://{}/{}",
            addr,
            routes::encode_url_path(options.open.as_deref().unwrap_or_default())
        );
        tracing::debug!("Serving {} at {}", serve_dir.display(), addr);
        state.log(format!("Serving {} at http://{}", serve_dir.display(), addr));

        *self.running.lock() = Some(Running {
            state,
            addr,
            shutdown,
            task,
        });

        Ok(ServerInfo {
            is_running: true,
            open_url,
        })
    }

    async fn shutdown(&self) -> Result<()> {
        let Some(running) = self.running.lock().take() else {
            return Ok(());
        };

        // Open SSE streams would hold graceful shutdown forever.
        running.state.disconnect_all();
        let _ = running.shutdown.send(());

        let mut task = running.task;
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut task).await.is_err() {
            tracing::warn!("Preview server did not stop in time, aborting");
            task.abort();
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    fn navigate(&self, path: &str) {
        self.with_state(|state| {
            state.broadcast(&PreviewEvent::Navigate {
                path: routes::encode_url_path(path),
            })
        });
    }

    fn reload_all(&self) {
        self.with_state(|state| state.broadcast(&PreviewEvent::Reload));
    }

    fn update_body(&self, file: &str, body: &str, highlight: bool, cursor: Option<Position>) {
        self.with_state(|state| {
            state.broadcast(&PreviewEvent::UpdateBody {
                path: url_path(state, file),
                body: body.to_string(),
                highlight,
                cursor,
            })
        });
    }

    fn highlight(&self, file: &str, position: Position) {
        self.with_state(|state| {
            state.broadcast(&PreviewEvent::Highlight {
                path: url_path(state, file),
                position,
            })
        });
    }
}
