//! Recording fakes of the session's collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use preview_sync::config::EditorSettings;
use preview_sync::decorations::DecorationRecord;
use preview_sync::host::{
    DocumentSnapshot, EditorHost, EditorView, Position, PreviewServer, ServerInfo, StartOptions,
    TerminalSink, ViewId,
};
use preview_sync::lifecycle::{LifecycleState, StatusItem};
use preview_sync::session::SessionHandle;
use preview_sync::{Result, SyncError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start(StartOptions),
    Shutdown,
    Navigate(String),
    Reload,
    UpdateBody {
        file: String,
        body: String,
        highlight: bool,
        cursor: Option<Position>,
    },
    Highlight {
        file: String,
        position: Position,
    },
}

#[derive(Default)]
pub struct RecordingServer {
    calls: Mutex<Vec<Call>>,
    running: AtomicBool,
    /// When set, `start` waits for a notification before completing
    gate: Option<Arc<Notify>>,
    fail_start: bool,
}

impl RecordingServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Default::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_start: true,
            ..Default::default()
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn starts(&self) -> Vec<StartOptions> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Start(options) => Some(options),
                _ => None,
            })
            .collect()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::UpdateBody { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| wanted(*call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl PreviewServer for RecordingServer {
    async fn start(&self, options: StartOptions) -> Result<ServerInfo> {
        let open = options.open.clone().unwrap_or_default();
        let address = format!("{}:{}", options.config.host, options.config.port);
        self.record(Call::Start(options));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_start {
            return Err(SyncError::Server("bind failed".to_string()));
        }

        self.running.store(true, Ordering::SeqCst);
        Ok(ServerInfo {
            is_running: true,
            open_url: format!("http://{}/{}", address, open),
        })
    }

    async fn shutdown(&self) -> Result<()> {
        self.record(Call::Shutdown);
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn navigate(&self, path: &str) {
        self.record(Call::Navigate(path.to_string()));
    }

    fn reload_all(&self) {
        self.record(Call::Reload);
    }

    fn update_body(&self, file: &str, body: &str, highlight: bool, cursor: Option<Position>) {
        self.record(Call::UpdateBody {
            file: file.to_string(),
            body: body.to_string(),
            highlight,
            cursor,
        });
    }

    fn highlight(&self, file: &str, position: Position) {
        self.record(Call::Highlight {
            file: file.to_string(),
            position,
        });
    }
}

#[derive(Default)]
pub struct RecordingEditor {
    pub workspace: Option<PathBuf>,
    pub active: Mutex<Option<DocumentSnapshot>>,
    pub cursor: Mutex<Option<Position>>,
    pub views: Mutex<Vec<EditorView>>,
    pub decorations: Mutex<Vec<(ViewId, Vec<DecorationRecord>)>>,
    pub infos: Mutex<Vec<String>>,
    pub statuses: Mutex<Vec<StatusItem>>,
    pub persisted: Mutex<Vec<(String, String)>>,
}

impl RecordingEditor {
    pub fn with_workspace(workspace: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            workspace: Some(workspace.into()),
            ..Default::default()
        })
    }

    pub fn without_workspace() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn show(&self, id: u64, path: &str) {
        self.views.lock().push(EditorView {
            id: ViewId(id),
            path: path.to_string(),
        });
    }

    pub fn last_decorations(&self, id: u64) -> Option<Vec<DecorationRecord>> {
        self.decorations
            .lock()
            .iter()
            .rev()
            .find(|(view, _)| *view == ViewId(id))
            .map(|(_, records)| records.clone())
    }
}

#[async_trait]
impl EditorHost for RecordingEditor {
    fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace.clone()
    }

    fn active_document(&self) -> Option<DocumentSnapshot> {
        self.active.lock().clone()
    }

    fn active_cursor(&self) -> Option<Position> {
        *self.cursor.lock()
    }

    fn visible_views(&self) -> Vec<EditorView> {
        self.views.lock().clone()
    }

    fn set_decorations(&self, view: ViewId, decorations: &[DecorationRecord]) {
        self.decorations.lock().push((view, decorations.to_vec()));
    }

    fn show_info(&self, message: &str) {
        self.infos.lock().push(message.to_string());
    }

    fn set_status(&self, status: &StatusItem) {
        self.statuses.lock().push(status.clone());
    }

    fn persist_state(&self, key: &str, value: &str) {
        self.persisted
            .lock()
            .push((key.to_string(), value.to_string()));
    }
}

#[derive(Clone, Default)]
pub struct Lines(pub Arc<Mutex<Vec<String>>>);

impl Lines {
    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

impl TerminalSink for Lines {
    fn write_line(&mut self, text: &str) {
        self.0.lock().push(text.to_string());
    }
}

pub struct Harness {
    pub handle: SessionHandle,
    pub server: Arc<RecordingServer>,
    pub editor: Arc<RecordingEditor>,
    pub lines: Lines,
}

impl Harness {
    pub fn new(
        server: Arc<RecordingServer>,
        editor: Arc<RecordingEditor>,
        settings: EditorSettings,
    ) -> Self {
        let lines = Lines::default();
        let handle = SessionHandle::spawn(
            server.clone(),
            Some(editor.clone() as Arc<dyn EditorHost>),
            Box::new(lines.clone()),
            settings,
        );
        Self {
            handle,
            server,
            editor,
            lines,
        }
    }

    /// Wait until the session has handled everything sent so far.
    pub async fn settle(&self) -> LifecycleState {
        self.handle.status().await.unwrap()
    }
}

pub fn body_injection() -> EditorSettings {
    EditorSettings {
        inject_body: Some(true),
        ..Default::default()
    }
}

pub fn html(body: &str) -> String {
    format!("<html><head></head><body>{}</body></html>", body)
}
