//! Collaborator seams: the preview server, the host editor, and the terminal.
//!
//! The session only talks to the outside world through these traits. The
//! crate ships one implementation of each (`SsePreviewServer`, `StdioEditor`,
//! `ConsoleTerminal`); tests use recording fakes.

use crate::config::PreviewConfig;
use crate::decorations::DecorationRecord;
use crate::error::Result;
use crate::lifecycle::StatusItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Zero-based cursor position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Full text of a document at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Absolute path of the document
    pub path: String,
    pub text: String,
}

impl DocumentSnapshot {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Identifier of one visible editor view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub u64);

/// A visible editor view and the document it displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorView {
    pub id: ViewId,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

/// Everything the preview server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOptions {
    /// Merged configuration for this run
    pub config: PreviewConfig,
    pub inject_body: bool,
    /// Served root; relative to `workspace` when one is set, absolute otherwise
    pub root: PathBuf,
    pub workspace: Option<PathBuf>,
    /// Root-relative path to open first
    pub open: Option<String>,
    /// The server must not prompt or open windows on its own
    pub non_interactive: bool,
}

impl StartOptions {
    /// Absolute directory the server should serve.
    pub fn serve_dir(&self) -> PathBuf {
        match &self.workspace {
            Some(workspace) => workspace.join(&self.root),
            None => self.root.clone(),
        }
    }
}

/// What a started preview server reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub is_running: bool,
    pub open_url: String,
}

/// The live-preview server.
///
/// `start` and `shutdown` are the only suspension points; the commands are
/// fire-and-forget.
#[async_trait]
pub trait PreviewServer: Send + Sync {
    async fn start(&self, options: StartOptions) -> Result<ServerInfo>;

    async fn shutdown(&self) -> Result<()>;

    fn is_running(&self) -> bool;

    /// Navigate the browser to a root-relative URL path (`/docs/a.html`).
    fn navigate(&self, path: &str);

    fn reload_all(&self);

    fn update_body(&self, file: &str, body: &str, highlight: bool, cursor: Option<Position>);

    fn highlight(&self, file: &str, position: Position);
}

/// The host editor.
#[async_trait]
pub trait EditorHost: Send + Sync {
    fn workspace_root(&self) -> Option<PathBuf>;

    fn active_document(&self) -> Option<DocumentSnapshot>;

    fn active_cursor(&self) -> Option<Position>;

    fn visible_views(&self) -> Vec<EditorView>;

    /// Replace every decoration this crate owns in `view`.
    fn set_decorations(&self, view: ViewId, decorations: &[DecorationRecord]);

    /// Non-blocking, non-modal informational message.
    fn show_info(&self, message: &str);

    fn set_status(&self, status: &StatusItem);

    /// Persist a namespaced workspace value (the lifecycle state).
    fn persist_state(&self, _key: &str, _value: &str) {}

    fn is_dark_theme(&self) -> bool {
        true
    }

    /// Whether `path` is a file or a directory, `None` if it does not exist.
    async fn stat(&self, path: &Path) -> Option<FileKind> {
        let metadata = tokio::fs::metadata(path).await.ok()?;
        Some(if metadata.is_dir() {
            FileKind::Directory
        } else {
            FileKind::File
        })
    }
}

/// `path` relative to `base` with `/` separators, `None` if outside `base`
/// or equal to it.
pub fn relative_path(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    (!joined.is_empty()).then_some(joined)
}

/// Line-oriented terminal output.
pub trait TerminalSink: Send {
    fn write_line(&mut self, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        let base = Path::new("/work/site");
        assert_eq!(
            relative_path(Path::new("/work/site/docs/a.html"), base).as_deref(),
            Some("docs/a.html")
        );
        assert_eq!(relative_path(Path::new("/work/site"), base), None);
        assert_eq!(relative_path(Path::new("/elsewhere/a.html"), base), None);
    }

    #[test]
    fn test_serve_dir() {
        let mut options = StartOptions {
            config: PreviewConfig::default(),
            inject_body: false,
            root: PathBuf::from("public"),
            workspace: Some(PathBuf::from("/work")),
            open: None,
            non_interactive: true,
        };
        assert_eq!(options.serve_dir(), PathBuf::from("/work/public"));

        options.workspace = None;
        options.root = PathBuf::from("/tmp/single");
        assert_eq!(options.serve_dir(), PathBuf::from("/tmp/single"));
    }
}
