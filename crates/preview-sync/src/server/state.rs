//! Shared state for the preview server.
//!
//! Tracks connected browser clients and fans preview commands out to them.
//! Uses parking_lot locks; no lock is held across an await point.

use crate::host::Position;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Events pushed to connected browsers over SSE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PreviewEvent {
    Connected { id: usize },
    Navigate { path: String },
    Reload,
    #[serde(rename_all = "camelCase")]
    UpdateBody {
        /// URL path of the page the body belongs to
        path: Option<String>,
        body: String,
        highlight: bool,
        cursor: Option<Position>,
    },
    Highlight { path: Option<String>, position: Position },
}

/// Per-client event queue depth; a client that falls this far behind misses events.
const CLIENT_QUEUE: usize = 100;

pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

pub struct PreviewState {
    pub clients: ClientRegistry,
    pub next_client_id: RwLock<usize>,
    /// Directory files are served from
    pub serve_dir: PathBuf,
    /// Browsers accept body updates
    pub inject_body: bool,
    log: Option<mpsc::UnboundedSender<Value>>,
}

impl PreviewState {
    pub fn new(serve_dir: PathBuf, inject_body: bool, log: Option<mpsc::UnboundedSender<Value>>) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: RwLock::new(0),
            serve_dir,
            inject_body,
            log,
        }
    }

    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let (tx, rx) = mpsc::channel(CLIENT_QUEUE);
        self.clients.write().insert(id, tx);

        (id, rx)
    }

    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Drop every client sender, ending their SSE streams.
    pub fn disconnect_all(&self) {
        self.clients.write().clear();
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Queue `event` for every connected client.
    ///
    /// Never waits: full queues skip the event, closed ones are pruned.
    pub fn broadcast(&self, event: &PreviewEvent) {
        let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());

        let clients = self.clients.read().clone();
        let mut failed_ids = Vec::new();

        for (id, tx) in clients {
            match tx.try_send(json.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!("Client {} is lagging, event skipped", id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => failed_ids.push(id),
            }
        }

        for id in failed_ids {
            self.unregister_client(id);
        }
    }

    /// Forward a log line to whoever listens for server messages.
    pub fn log(&self, text: impl Into<String>) {
        if let Some(log) = &self.log {
            let _ = log.send(json!({ "msg": text.into() }));
        }
    }
}

pub type SharedState = Arc<PreviewState>;
