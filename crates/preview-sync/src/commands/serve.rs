//! Serve command implementation.
//!
//! Runs one preview session: the SSE preview server, a stdio editor bridge,
//! and a stderr terminal, all driven from a single event loop.

use crate::cli::ServeArgs;
use crate::config::EditorSettings;
use crate::error::{Result, ResultExt};
use crate::host::{DocumentSnapshot, EditorHost};
use crate::logger::should_use_colors;
use crate::server::SsePreviewServer;
use crate::session::{EditorEvent, SessionHandle, TransitionOutcome};
use crate::stdio::{self, StdioEditor};
use crate::terminal::ConsoleTerminal;
use crate::ui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::mpsc;

/// Execute the serve command.
///
/// # Process Flow
///
/// 1. Load editor settings
/// 2. Wire the preview server, stdio editor, and terminal into a session
/// 3. Start the server (unless `--no-start`)
/// 4. Main event loop:
///    - Feed stdin lines into the session
///    - Relay server log lines through the message bridge
///    - Stop on Ctrl+C or stdin EOF
/// 5. Close the server and dispose the session
///
/// # Errors
///
/// Returns errors for invalid settings, an unreadable target, or a server
/// that fails to start or stop.
pub async fn execute(args: ServeArgs, no_color: bool) -> Result<()> {
    let settings = EditorSettings::load(args.settings.as_deref())?;
    let workspace = args.workspace.as_deref().map(absolute).transpose()?;
    let target = args.target.as_deref().map(absolute).transpose()?;

    let (log_tx, mut log_rx) = mpsc::unbounded_channel();
    let server = Arc::new(SsePreviewServer::new().with_log(log_tx));
    let editor = Arc::new(StdioEditor::stdout(workspace.clone()));

    // Single-file mode serves the active document; the target stands in for it.
    if workspace.is_none() {
        if let Some(target) = &target {
            seed_active_document(&editor, target).await?;
        }
    }

    let terminal = ConsoleTerminal::new("[preview]", !no_color && should_use_colors());
    let handle = SessionHandle::spawn(
        server,
        Some(editor.clone() as Arc<dyn EditorHost>),
        Box::new(terminal),
        settings,
    );

    if !args.no_start {
        start(&handle, target).await?;
    }

    ui::info("Reading editor events from stdin, press Ctrl+C to stop");

    let pump = stdio::pump(BufReader::new(tokio::io::stdin()), &editor, &handle);
    tokio::pin!(pump);

    loop {
        tokio::select! {
            Some(message) = log_rx.recv() => {
                handle.server_message(message).await?;
            }

            result = &mut pump => {
                result?;
                ui::info("Editor input closed");
                break;
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down preview...");
                break;
            }
        }
    }

    handle.close().await?;
    handle.dispose().await?;

    ui::success("Preview stopped");
    Ok(())
}

async fn start(handle: &SessionHandle, target: Option<PathBuf>) -> Result<()> {
    let spinner = ui::Spinner::new("Starting preview server...");

    match handle.start(target).await {
        Ok(TransitionOutcome::Started { open_url }) => {
            spinner.finish(&format!("Preview running at {}", open_url));
            Ok(())
        }
        Ok(TransitionOutcome::Aborted) => {
            spinner.fail("Preview start aborted");
            Ok(())
        }
        Ok(_) => {
            spinner.clear();
            Ok(())
        }
        Err(e) => {
            spinner.fail("Preview server failed to start");
            Err(e)
        }
    }
}

async fn seed_active_document(editor: &StdioEditor, target: &Path) -> Result<()> {
    if tokio::fs::metadata(target).await.is_ok_and(|m| m.is_dir()) {
        return Ok(());
    }

    let text = tokio::fs::read_to_string(target).await.with_path(target)?;
    editor.observe(&EditorEvent::ActiveDocumentChanged {
        document: Some(DocumentSnapshot::new(target.to_string_lossy(), text)),
    });
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
