//! JSON-lines editor bridge over stdin/stdout.
//!
//! An editor plugin (or a script) drives the session by writing one JSON
//! object per line to stdin, tagged by `event`:
//!
//! ```json
//! {"event":"documentChanged","document":{"path":"/site/index.html","text":"..."}}
//! {"event":"viewsChanged","views":[{"id":1,"path":"/site/index.html"}]}
//! {"event":"workerMessage","data":"{\"report\":{\"results\":[]}}"}
//! {"event":"settings","settings":{"injectBody":true,"port":5600}}
//! {"event":"toggle"}
//! ```
//!
//! Decorations, status changes, and informational messages go back out on
//! stdout, one JSON object per line, tagged by `type`.

use crate::config::EditorSettings;
use crate::decorations::DecorationRecord;
use crate::error::{Result, SyncError};
use crate::host::{DocumentSnapshot, EditorHost, EditorView, Position, ViewId};
use crate::lifecycle::StatusItem;
use crate::session::{EditorEvent, SessionHandle, TransitionOutcome};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Inputs that are not editor events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Command {
    ViewsChanged { views: Vec<EditorView> },
    Theme { dark: bool },
    /// Raw worker output; a string is passed through, anything else is re-serialized
    WorkerMessage { data: Value },
    ServerMessage { message: Value },
    /// Replacement editor settings, used from the next start
    Settings { settings: EditorSettings },
    Start {
        #[serde(default)]
        target: Option<PathBuf>,
    },
    Close,
    Toggle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Editor(EditorEvent),
    Command(Command),
}

/// Parse one stdin line.
pub fn parse_line(line: &str) -> Result<Inbound> {
    let value: Value = serde_json::from_str(line)?;
    if let Ok(event) = EditorEvent::deserialize(&value) {
        return Ok(Inbound::Editor(event));
    }
    Command::deserialize(&value)
        .map(Inbound::Command)
        .map_err(|e| SyncError::InvalidArgument(format!("Unrecognized input line: {}", e)))
}

/// Messages written to stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound<'a> {
    Decorations {
        view: ViewId,
        decorations: &'a [DecorationRecord],
    },
    Status {
        status: &'a StatusItem,
    },
    Info {
        message: &'a str,
    },
    State {
        key: &'a str,
        value: &'a str,
    },
}

#[derive(Debug)]
struct Mirror {
    active: Option<DocumentSnapshot>,
    cursor: Option<Position>,
    views: Vec<EditorView>,
    dark: bool,
}

/// [`EditorHost`] that mirrors editor state from stdin and reports on stdout.
pub struct StdioEditor {
    workspace: Option<PathBuf>,
    mirror: RwLock<Mirror>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl StdioEditor {
    pub fn new(workspace: Option<PathBuf>, out: Box<dyn Write + Send>) -> Self {
        Self {
            workspace,
            mirror: RwLock::new(Mirror {
                active: None,
                cursor: None,
                views: Vec::new(),
                dark: true,
            }),
            out: Mutex::new(out),
        }
    }

    pub fn stdout(workspace: Option<PathBuf>) -> Self {
        Self::new(workspace, Box::new(std::io::stdout()))
    }

    /// Track the active document and cursor carried by `event`.
    pub fn observe(&self, event: &EditorEvent) {
        let mut mirror = self.mirror.write();
        match event {
            EditorEvent::ActiveDocumentChanged { document } => {
                mirror.active = document.clone();
                mirror.cursor = None;
            }
            EditorEvent::SelectionChanged { document, cursor } => {
                mirror.active = Some(document.clone());
                mirror.cursor = *cursor;
            }
            EditorEvent::DocumentChanged { document } => {
                let is_active = mirror
                    .active
                    .as_ref()
                    .map_or(true, |active| active.path == document.path);
                if is_active {
                    mirror.active = Some(document.clone());
                }
            }
            EditorEvent::DocumentSaved { .. } => {}
        }
    }

    /// Apply a non-event command to the mirror; `true` if it was handled here.
    fn apply(&self, command: &Command) -> bool {
        match command {
            Command::ViewsChanged { views } => {
                self.mirror.write().views = views.clone();
                true
            }
            Command::Theme { dark } => {
                self.mirror.write().dark = *dark;
                true
            }
            _ => false,
        }
    }

    fn emit(&self, message: &Outbound<'_>) {
        let line = match serde_json::to_string(message) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to encode editor message: {}", e);
                return;
            }
        };

        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write to editor: {}", e);
        }
    }
}

#[async_trait]
impl EditorHost for StdioEditor {
    fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace.clone()
    }

    fn active_document(&self) -> Option<DocumentSnapshot> {
        self.mirror.read().active.clone()
    }

    fn active_cursor(&self) -> Option<Position> {
        self.mirror.read().cursor
    }

    fn visible_views(&self) -> Vec<EditorView> {
        self.mirror.read().views.clone()
    }

    fn set_decorations(&self, view: ViewId, decorations: &[DecorationRecord]) {
        self.emit(&Outbound::Decorations { view, decorations });
    }

    fn show_info(&self, message: &str) {
        self.emit(&Outbound::Info { message });
    }

    fn set_status(&self, status: &StatusItem) {
        self.emit(&Outbound::Status { status });
    }

    fn persist_state(&self, key: &str, value: &str) {
        self.emit(&Outbound::State { key, value });
    }

    fn is_dark_theme(&self) -> bool {
        self.mirror.read().dark
    }
}

/// Feed `reader` into the session until EOF.
///
/// Lifecycle requests run in their own tasks so that input keeps flowing
/// while a start or close is in flight.
pub async fn pump<R>(reader: R, editor: &StdioEditor, handle: &SessionHandle) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let inbound = match parse_line(&line) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };

        match inbound {
            Inbound::Editor(event) => {
                editor.observe(&event);
                handle.editor_event(event).await?;
            }
            Inbound::Command(command) => {
                if editor.apply(&command) {
                    continue;
                }
                dispatch_command(command, handle).await?;
            }
        }
    }

    Ok(())
}

async fn dispatch_command(command: Command, handle: &SessionHandle) -> Result<()> {
    match command {
        Command::WorkerMessage { data } => {
            let raw = match data {
                Value::String(raw) => raw,
                other => other.to_string(),
            };
            handle.worker_message(raw).await
        }
        Command::ServerMessage { message } => handle.server_message(message).await,
        Command::Settings { settings } => handle.update_settings(settings).await,
        Command::Start { target } => {
            let handle = handle.clone();
            tokio::spawn(async move { report(handle.start(target).await) });
            Ok(())
        }
        Command::Close => {
            let handle = handle.clone();
            tokio::spawn(async move { report(handle.close().await) });
            Ok(())
        }
        Command::Toggle => {
            let handle = handle.clone();
            tokio::spawn(async move { report(handle.toggle().await) });
            Ok(())
        }
        Command::ViewsChanged { .. } | Command::Theme { .. } => Ok(()),
    }
}

fn report(outcome: Result<TransitionOutcome>) {
    match outcome {
        Ok(TransitionOutcome::Started { open_url }) => {
            crate::ui::success(&format!("Preview running at {}", open_url))
        }
        Ok(TransitionOutcome::Closed) => crate::ui::info("Preview closed"),
        Ok(TransitionOutcome::Aborted) => crate::ui::warning("Preview start aborted"),
        Ok(TransitionOutcome::Ignored) => {
            tracing::debug!("Lifecycle request ignored");
        }
        Err(e) => crate::ui::error(&e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn lines(&self) -> Vec<Value> {
            String::from_utf8_lossy(&self.0.lock())
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    #[test]
    fn test_parse_editor_event() {
        let inbound = parse_line(
            r#"{"event":"selectionChanged","document":{"path":"/a.html","text":"x"},"cursor":{"line":1,"character":2}}"#,
        )
        .unwrap();
        assert_eq!(
            inbound,
            Inbound::Editor(EditorEvent::SelectionChanged {
                document: DocumentSnapshot::new("/a.html", "x"),
                cursor: Some(Position::new(1, 2)),
            })
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_line(r#"{"event":"toggle"}"#).unwrap(),
            Inbound::Command(Command::Toggle)
        );
        assert_eq!(
            parse_line(r#"{"event":"start","target":"/site/docs"}"#).unwrap(),
            Inbound::Command(Command::Start {
                target: Some(PathBuf::from("/site/docs"))
            })
        );
        assert!(matches!(
            parse_line(r#"{"event":"viewsChanged","views":[{"id":3,"path":"/a.html"}]}"#).unwrap(),
            Inbound::Command(Command::ViewsChanged { views }) if views[0].id == ViewId(3)
        ));
    }

    #[test]
    fn test_parse_settings_command() {
        let inbound =
            parse_line(r#"{"event":"settings","settings":{"injectBody":true,"port":5600}}"#).unwrap();
        assert_eq!(
            inbound,
            Inbound::Command(Command::Settings {
                settings: EditorSettings {
                    inject_body: Some(true),
                    port: Some(5600),
                    ..Default::default()
                }
            })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_line("not json").is_err());
        assert!(parse_line(r#"{"event":"launchRockets"}"#).is_err());
    }

    #[test]
    fn test_observe_tracks_active_document() {
        let editor = StdioEditor::new(None, Box::new(Buffer::default()));

        editor.observe(&EditorEvent::SelectionChanged {
            document: DocumentSnapshot::new("/a.html", "one"),
            cursor: Some(Position::new(0, 1)),
        });
        assert_eq!(editor.active_cursor(), Some(Position::new(0, 1)));

        editor.observe(&EditorEvent::DocumentChanged {
            document: DocumentSnapshot::new("/b.html", "other"),
        });
        assert_eq!(editor.active_document().unwrap().path, "/a.html");

        editor.observe(&EditorEvent::DocumentChanged {
            document: DocumentSnapshot::new("/a.html", "two"),
        });
        assert_eq!(editor.active_document().unwrap().text, "two");

        editor.observe(&EditorEvent::ActiveDocumentChanged { document: None });
        assert!(editor.active_document().is_none());
        assert!(editor.active_cursor().is_none());
    }

    #[test]
    fn test_outbound_lines() {
        let buffer = Buffer::default();
        let editor = StdioEditor::new(None, Box::new(buffer.clone()));

        editor.show_info("hello");
        editor.set_decorations(ViewId(7), &[]);
        editor.persist_state("preview-sync.state", "on");

        let lines = buffer.lines();
        assert_eq!(lines[0], json!({"type": "info", "message": "hello"}));
        assert_eq!(lines[1], json!({"type": "decorations", "view": 7, "decorations": []}));
        assert_eq!(
            lines[2],
            json!({"type": "state", "key": "preview-sync.state", "value": "on"})
        );
    }

    #[test]
    fn test_apply_views_and_theme() {
        let editor = StdioEditor::new(None, Box::new(Buffer::default()));
        assert!(editor.apply(&Command::ViewsChanged {
            views: vec![EditorView {
                id: ViewId(1),
                path: "/a.html".to_string()
            }]
        }));
        assert!(editor.apply(&Command::Theme { dark: false }));
        assert!(!editor.apply(&Command::Toggle));

        assert_eq!(editor.visible_views().len(), 1);
        assert!(!editor.is_dark_theme());
    }
}
