//! Editor event and worker message handlers.

use super::{EditorEvent, Message, Session};
use crate::bridge::MessageSource;
use crate::classify::{classify, extract_body};
use crate::decorations::{annotation_color, FlushOptions};
use crate::host::{relative_path, DocumentSnapshot, Position};
use crate::rules::{navigation, should_highlight, should_inject_body, should_inject_css, Navigation};
use crate::worker::{ReportAction, WorkerPayload};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Body pushes repeated after a markup save, while the server re-parses.
pub(crate) const RECONFIRM_DELAYS: [Duration; 3] = [
    Duration::from_millis(250),
    Duration::from_millis(500),
    Duration::from_millis(1000),
];

impl Session {
    /// Server is up and the lifecycle agrees.
    fn is_live(&self) -> bool {
        self.lifecycle.is_on() && self.server.is_running()
    }

    pub(super) fn handle_editor_event(&mut self, event: EditorEvent) {
        if !self.is_live() {
            tracing::debug!("Preview not running, ignoring editor event");
            return;
        }

        match event {
            EditorEvent::ActiveDocumentChanged { document } => self.on_active_changed(document),
            EditorEvent::SelectionChanged { document, cursor } => {
                self.on_selection_changed(document, cursor)
            }
            EditorEvent::DocumentSaved { path } => self.on_saved(&path),
            EditorEvent::DocumentChanged { document } => self.on_changed(document),
        }
    }

    fn on_active_changed(&mut self, document: Option<DocumentSnapshot>) {
        let Some(document) = document else {
            return;
        };

        self.request_flush(&document.path, FlushOptions::forced());
        self.navigate(&document.path, &document.text);
    }

    fn on_selection_changed(&mut self, document: DocumentSnapshot, cursor: Option<Position>) {
        if !classify(&document.path).is_page() {
            return;
        }

        if !should_inject_body(&self.config) {
            if let Some(cursor) = cursor {
                if should_highlight(&document.path, &self.config) {
                    self.server.highlight(&document.path, cursor);
                }
            }
            return;
        }

        self.page.update(&document.path, &document.text);
        self.push_body(&document.path, cursor);
    }

    fn on_saved(&mut self, path: &str) {
        let class = classify(path);

        // Stylesheets are hot-swapped by the server when injection is on.
        if class.is_stylesheet && should_inject_css(&self.config) {
            tracing::debug!("Stylesheet saved with CSS injection on, no reload");
            return;
        }

        self.server.reload_all();

        if !class.is_markup || !should_inject_body(&self.config) {
            return;
        }

        self.push_body(path, None);
        self.schedule_reconfirm(path);
    }

    fn on_changed(&mut self, document: DocumentSnapshot) {
        if !classify(&document.path).is_page() || !should_inject_body(&self.config) {
            return;
        }

        self.page.update(&document.path, &document.text);
        let file = self.page.current().file.clone();
        self.push_body(&file, None);
    }

    /// Send the buffered body of `file` to the browser, if the page buffer
    /// is stable and still tracks `file`.
    fn push_body(&mut self, file: &str, cursor: Option<Position>) {
        if !self.page.is_stable() {
            tracing::debug!("Page buffer unstable, holding body update for {}", file);
            return;
        }
        if !classify(file).is_page() || !should_inject_body(&self.config) {
            return;
        }

        let current = self.page.current();
        if current.file != file {
            return;
        }

        let cursor = cursor.or_else(|| self.editor.as_ref().and_then(|e| e.active_cursor()));
        let body = extract_body(&current.text).unwrap_or(&current.text);
        self.server
            .update_body(file, body, should_highlight(file, &self.config), cursor);
    }

    fn schedule_reconfirm(&mut self, file: &str) {
        self.reconfirm.retain(|handle| !handle.is_finished());

        for delay in RECONFIRM_DELAYS {
            let mailbox = self.mailbox.clone();
            let file = file.to_string();
            self.reconfirm.push(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(tx) = mailbox.upgrade() {
                    let _ = tx.send(Message::Reconfirm(file)).await;
                }
            }));
        }
    }

    pub(super) fn reconfirm_body(&mut self, file: &str) {
        if self.is_live() {
            self.push_body(file, None);
        }
    }

    fn navigate(&mut self, file: &str, text: &str) {
        match navigation(Some(file), Some(text), &self.config) {
            Navigation::Go => {}
            Navigation::Skip => return,
            Navigation::MissingTags => {
                let notice = format!("File: {} does not contain required HTML tags.", file);
                self.terminal.write(&[notice.as_str()]);
                return;
            }
        }

        if self.active_file.as_deref() == Some(file) {
            return;
        }
        self.active_file = Some(file.to_string());

        // Single-file mode serves one document; there is nowhere to go.
        let Some(root) = &self.root_absolute else {
            return;
        };
        match relative_path(Path::new(file), root) {
            Some(relative) => self.server.navigate(&format!("/{}", relative)),
            None => tracing::debug!("{} is outside the served root, not navigating", file),
        }
    }

    pub(super) fn handle_worker_message(&mut self, raw: &str) {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Dropping malformed worker message: {}", e);
                return;
            }
        };

        self.bridge
            .relay(MessageSource::Worker, &value, &mut self.terminal);

        let payload = match WorkerPayload::from_value(&value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!("Dropping worker message with invalid report: {}", e);
                return;
            }
        };
        let Some(action) = payload.action() else {
            return;
        };

        let file = self.page.current().file.clone();
        if file.is_empty() {
            tracing::debug!("No tracked file, dropping worker report");
            return;
        }

        let dark = self.editor.as_ref().map_or(true, |e| e.is_dark_theme());
        let entries = match action {
            ReportAction::Clear => Vec::new(),
            ReportAction::Replace(entries) => entries,
        };
        self.decorations
            .set_annotations(&file, &entries, annotation_color(dark));
        self.request_flush(&file, FlushOptions::default());
    }

    pub(super) fn handle_server_message(&mut self, message: &Value) {
        self.bridge
            .relay(MessageSource::PreviewServer, message, &mut self.terminal);
    }

    fn request_flush(&mut self, file: &str, options: FlushOptions) {
        let mailbox = self.mailbox.clone();
        self.decorations.schedule_flush(file, options, move |file| async move {
            if let Some(tx) = mailbox.upgrade() {
                let _ = tx.send(Message::FlushDue(file)).await;
            }
        });
    }

    pub(super) fn flush_decorations(&mut self, file: &str) {
        if let Some(editor) = &self.editor {
            let updated = self.decorations.flush(file, editor.as_ref());
            tracing::debug!("Applied decorations for {} to {} view(s)", file, updated);
        }
    }
}
