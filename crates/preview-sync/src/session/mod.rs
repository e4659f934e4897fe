//! The synchronization session.
//!
//! One tokio task owns all mutable state: the page buffer, the decoration
//! store, the navigation memo, the message bridge, and the lifecycle. Every
//! input (editor events, worker messages, lifecycle requests, timer expiry)
//! arrives on that task's mailbox and is handled to completion before the
//! next one, so no locking is needed.
//!
//! Start and close sequences run in spawned tasks and report back through the
//! mailbox. While one is in flight the lifecycle reads `loading` and further
//! toggles are dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! # use preview_sync::session::SessionHandle;
//! # async fn run(handle: SessionHandle) -> preview_sync::Result<()> {
//! handle.toggle().await?;
//! handle.worker_message(r#"{"report":{"results":[]}}"#).await?;
//! handle.close().await?;
//! handle.dispose().await
//! # }
//! ```

mod dispatch;
mod start;

use crate::bridge::MessageBridge;
use crate::config::{EditorSettings, PreviewConfig};
use crate::decorations::DecorationStore;
use crate::error::{Result, SyncError};
use crate::host::{DocumentSnapshot, EditorHost, Position, PreviewServer, TerminalSink};
use crate::lifecycle::{Lifecycle, LifecycleState, StatusItem, STATE_KEY};
use crate::page::PageBuffer;
use crate::terminal::Terminal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use start::{StartOutcome, StartReport};

const MAILBOX_CAPACITY: usize = 256;

/// Editor notifications the session reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EditorEvent {
    /// Focus moved to another editor (or to none)
    ActiveDocumentChanged {
        #[serde(default)]
        document: Option<DocumentSnapshot>,
    },
    SelectionChanged {
        document: DocumentSnapshot,
        #[serde(default)]
        cursor: Option<Position>,
    },
    DocumentSaved { path: String },
    /// Text of a document was mutated
    DocumentChanged { document: DocumentSnapshot },
}

/// Result of a lifecycle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Started { open_url: String },
    /// Single-file mode without an open document
    Aborted,
    Closed,
    /// Dropped: already in that state, or a transition is in flight
    Ignored,
}

type Reply = oneshot::Sender<Result<TransitionOutcome>>;

enum Message {
    Start { target: Option<PathBuf>, reply: Reply },
    Close { reply: Reply },
    Toggle { reply: Reply },
    Editor(EditorEvent),
    Worker(String),
    ServerLog(Value),
    Settings(EditorSettings),
    Status { reply: oneshot::Sender<LifecycleState> },
    Dispose { reply: oneshot::Sender<()> },
    StartFinished(StartReport),
    CloseFinished(Result<()>),
    FlushDue(String),
    Reconfirm(String),
}

/// Cloneable front end of a running session.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Message>,
}

impl SessionHandle {
    /// Spawn the session task on the current tokio runtime.
    pub fn spawn(
        server: Arc<dyn PreviewServer>,
        editor: Option<Arc<dyn EditorHost>>,
        terminal: Box<dyn TerminalSink>,
        settings: EditorSettings,
    ) -> Self {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let session = Session {
            server,
            editor,
            settings,
            terminal: Terminal::new(terminal),
            mailbox: tx.downgrade(),
            config: PreviewConfig::default(),
            lifecycle: Lifecycle::new(),
            page: PageBuffer::new(),
            decorations: DecorationStore::new(),
            bridge: MessageBridge::new(),
            active_file: None,
            root_absolute: None,
            open_url: None,
            in_flight: None,
            reconfirm: Vec::new(),
        };
        tokio::spawn(session.run(rx));
        Self { tx }
    }

    /// Start the preview server, optionally opening `target` (file or directory).
    pub async fn start(&self, target: Option<PathBuf>) -> Result<TransitionOutcome> {
        self.request(|reply| Message::Start { target, reply }).await
    }

    pub async fn close(&self) -> Result<TransitionOutcome> {
        self.request(|reply| Message::Close { reply }).await
    }

    /// Close when on, start when off, nothing while loading.
    pub async fn toggle(&self) -> Result<TransitionOutcome> {
        self.request(|reply| Message::Toggle { reply }).await
    }

    pub async fn editor_event(&self, event: EditorEvent) -> Result<()> {
        self.send(Message::Editor(event)).await
    }

    /// Raw JSON text from the background worker.
    pub async fn worker_message(&self, raw: impl Into<String>) -> Result<()> {
        self.send(Message::Worker(raw.into())).await
    }

    /// A log message emitted by the preview server.
    pub async fn server_message(&self, message: Value) -> Result<()> {
        self.send(Message::ServerLog(message)).await
    }

    /// Replace the editor settings; they apply from the next start.
    pub async fn update_settings(&self, settings: EditorSettings) -> Result<()> {
        self.send(Message::Settings(settings)).await
    }

    /// Current lifecycle state.
    ///
    /// Also acts as a barrier: every message sent before it has been handled
    /// when it returns.
    pub async fn status(&self) -> Result<LifecycleState> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Status { reply }).await?;
        rx.await.map_err(|_| SyncError::SessionClosed)
    }

    /// Cancel pending timers, clear decorations, and stop the session task.
    pub async fn dispose(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Dispose { reply }).await?;
        rx.await.map_err(|_| SyncError::SessionClosed)
    }

    async fn request(&self, build: impl FnOnce(Reply) -> Message) -> Result<TransitionOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(build(reply)).await?;
        rx.await.map_err(|_| SyncError::SessionClosed)?
    }

    async fn send(&self, message: Message) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| SyncError::SessionClosed)
    }
}

struct Session {
    server: Arc<dyn PreviewServer>,
    editor: Option<Arc<dyn EditorHost>>,
    settings: EditorSettings,
    terminal: Terminal,
    mailbox: mpsc::WeakSender<Message>,
    config: PreviewConfig,
    lifecycle: Lifecycle,
    page: PageBuffer,
    decorations: DecorationStore,
    bridge: MessageBridge,
    /// Last file the browser was navigated to
    active_file: Option<String>,
    root_absolute: Option<PathBuf>,
    open_url: Option<String>,
    in_flight: Option<Reply>,
    reconfirm: Vec<JoinHandle<()>>,
}

impl Session {
    async fn run(mut self, mut rx: mpsc::Receiver<Message>) {
        while let Some(message) = rx.recv().await {
            match message {
                Message::Start { target, reply } => self.request_start(target, reply),
                Message::Close { reply } => self.request_close(reply),
                Message::Toggle { reply } => self.toggle(reply),
                Message::Editor(event) => self.handle_editor_event(event),
                Message::Worker(raw) => self.handle_worker_message(&raw),
                Message::ServerLog(value) => self.handle_server_message(&value),
                Message::Settings(settings) => self.settings = settings,
                Message::Status { reply } => {
                    let _ = reply.send(self.lifecycle.state());
                }
                Message::Dispose { reply } => {
                    self.dispose();
                    let _ = reply.send(());
                    return;
                }
                Message::StartFinished(report) => self.finish_start(report),
                Message::CloseFinished(result) => self.finish_close(result),
                Message::FlushDue(file) => self.flush_decorations(&file),
                Message::Reconfirm(file) => self.reconfirm_body(&file),
            }
        }
        self.dispose();
    }

    fn toggle(&mut self, reply: Reply) {
        match self.lifecycle.state() {
            LifecycleState::On => self.request_close(reply),
            LifecycleState::Off => self.request_start(None, reply),
            LifecycleState::Loading => {
                tracing::debug!("Toggle ignored while loading");
                let _ = reply.send(Ok(TransitionOutcome::Ignored));
            }
        }
    }

    fn request_start(&mut self, target: Option<PathBuf>, reply: Reply) {
        if self.in_flight.is_some() || self.lifecycle.state() != LifecycleState::Off {
            let _ = reply.send(Ok(TransitionOutcome::Ignored));
            return;
        }

        self.set_state(LifecycleState::Loading);
        self.in_flight = Some(reply);

        let server = Arc::clone(&self.server);
        let editor = self.editor.clone();
        let settings = self.settings.clone();
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            let report = start::run_start(server, editor, settings, target).await;
            if let Some(tx) = mailbox.upgrade() {
                let _ = tx.send(Message::StartFinished(report)).await;
            }
        });
    }

    fn finish_start(&mut self, report: StartReport) {
        for notice in &report.notices {
            self.notify(notice);
        }

        let result = match report.outcome {
            Ok(StartOutcome::Started { plan, info }) => {
                for line in &plan.debug_lines {
                    let parts: Vec<&str> = line.iter().map(String::as_str).collect();
                    self.terminal.write(&parts);
                }

                self.config = plan.config;
                self.root_absolute = plan.root_absolute;
                self.active_file = plan.opened_file;
                self.open_url = Some(info.open_url.clone());
                self.set_state(LifecycleState::On);
                tracing::info!("Preview server running at {}", info.open_url);

                Ok(TransitionOutcome::Started {
                    open_url: info.open_url,
                })
            }
            Ok(StartOutcome::Aborted) => {
                self.set_state(LifecycleState::Off);
                Ok(TransitionOutcome::Aborted)
            }
            Err(e) => {
                // Not rolled back: the state stays `loading` until close().
                tracing::warn!("Preview server failed to start: {}", e);
                Err(e)
            }
        };

        if let Some(reply) = self.in_flight.take() {
            let _ = reply.send(result);
        }
    }

    fn request_close(&mut self, reply: Reply) {
        if self.in_flight.is_some() || self.lifecycle.state() == LifecycleState::Off {
            let _ = reply.send(Ok(TransitionOutcome::Ignored));
            return;
        }

        self.set_state(LifecycleState::Loading);
        self.in_flight = Some(reply);

        self.cancel_timers();
        let editor = self.editor.clone();
        self.decorations.clear_all(editor.as_deref());
        self.bridge.reset();
        self.root_absolute = None;
        self.active_file = None;

        let server = Arc::clone(&self.server);
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            let result = server.shutdown().await;
            if let Some(tx) = mailbox.upgrade() {
                let _ = tx.send(Message::CloseFinished(result)).await;
            }
        });
    }

    fn finish_close(&mut self, result: Result<()>) {
        let result = match result {
            Ok(()) => {
                self.open_url = None;
                self.set_state(LifecycleState::Off);
                tracing::info!("Preview server stopped");
                Ok(TransitionOutcome::Closed)
            }
            Err(e) => {
                tracing::warn!("Preview server failed to shut down: {}", e);
                Err(e)
            }
        };

        if let Some(reply) = self.in_flight.take() {
            let _ = reply.send(result);
        }
    }

    fn set_state(&mut self, next: LifecycleState) {
        if let Err(e) = self.lifecycle.transition(next) {
            tracing::warn!("{}", e);
            return;
        }

        if let Some(editor) = &self.editor {
            editor.persist_state(STATE_KEY, next.as_str());
            editor.set_status(&StatusItem::for_state(next, self.open_url.as_deref()));
        }
    }

    /// User-visible, non-modal message.
    fn notify(&mut self, message: &str) {
        match &self.editor {
            Some(editor) => editor.show_info(message),
            None => {
                self.terminal.write(&[message]);
            }
        }
    }

    fn cancel_timers(&mut self) {
        self.decorations.cancel_pending();
        for handle in self.reconfirm.drain(..) {
            handle.abort();
        }
    }

    fn dispose(&mut self) {
        self.cancel_timers();
        let editor = self.editor.clone();
        self.decorations.clear_all(editor.as_deref());
    }
}
