//! Inline annotations rendered from worker diagnostics.
//!
//! The store maps a path-derived file identifier to the decorations for that
//! file. Every update replaces the whole list for the file. Rendering goes
//! through a single debounce slot shared by all files: a new flush request
//! cancels the pending one, so only the latest request's delay is honoured.
//! Requests are also dropped when the serialized store has not changed since
//! the previous request, unless forced.

use crate::host::{EditorHost, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delay before a scheduled flush reaches the editor.
pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_millis(250);

/// Column the trailing text is anchored at, past the end of typical lines.
pub const DECORATION_COLUMN: u32 = 1024;

const DARK_THEME_COLOR: &str = "#ebb549";
const LIGHT_THEME_COLOR: &str = "#f69d50";

/// Annotation color for the editor's theme.
pub fn annotation_color(dark_theme: bool) -> &'static str {
    if dark_theme {
        DARK_THEME_COLOR
    } else {
        LIGHT_THEME_COLOR
    }
}

/// Stable identifier for a path: a 32-bit string hash rendered in base 32.
///
/// Hashes UTF-16 code units so identifiers match the ones other tooling
/// derives for the same path.
pub fn file_identifier(path: &str) -> String {
    let mut hash: i32 = 0;
    for unit in path.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    to_base32(i64::from(hash).unsigned_abs())
}

fn to_base32(mut value: u64) -> String {
    const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 32) as usize]);
        value /= 32;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// One annotation to render, as reported for a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    pub display_text: String,
    pub source_line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderHint {
    pub trailing_text: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationRange {
    pub start: Position,
    pub end: Position,
}

/// A rendered decoration: trailing text anchored at the end of one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationRecord {
    pub render_hint: RenderHint,
    pub range: DecorationRange,
}

impl DecorationRecord {
    fn from_entry(entry: &AnnotationEntry, color: &str) -> Self {
        let anchor = Position::new(entry.source_line.saturating_sub(1), DECORATION_COLUMN);
        Self {
            render_hint: RenderHint {
                trailing_text: entry.display_text.clone(),
                color: color.to_string(),
            },
            range: DecorationRange {
                start: anchor,
                end: anchor,
            },
        }
    }
}

/// Options for [`DecorationStore::schedule_flush`].
#[derive(Debug, Clone, Copy)]
pub struct FlushOptions {
    pub delay: Duration,
    /// Flush even if the store did not change
    pub force: bool,
}

impl Default for FlushOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_FLUSH_DELAY,
            force: false,
        }
    }
}

impl FlushOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }
}

/// Single-slot cancellable timer.
///
/// Scheduling aborts whatever was pending.
#[derive(Debug, Default)]
pub struct Debounce {
    pending: Option<JoinHandle<()>>,
}

impl Debounce {
    pub fn schedule<Fut>(&mut self, delay: Duration, task: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Default)]
pub struct DecorationStore {
    records: BTreeMap<String, Vec<DecorationRecord>>,
    last_snapshot: Option<String>,
    debounce: Debounce,
}

impl DecorationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all decorations for `file` with one record per entry.
    pub fn set_annotations(&mut self, file: &str, entries: &[AnnotationEntry], color: &str) {
        let records = entries
            .iter()
            .map(|entry| DecorationRecord::from_entry(entry, color))
            .collect();
        self.records.insert(file_identifier(file), records);
    }

    /// Decorations for `file`; a missing key reads as empty.
    pub fn decorations_for(&self, file: &str) -> &[DecorationRecord] {
        self.records
            .get(&file_identifier(file))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Request a debounced flush of `file`'s decorations.
    ///
    /// When the timer fires, `on_due(file)` runs; the owner is expected to
    /// call [`flush`](Self::flush) in response. Returns `false` when the
    /// request was dropped.
    pub fn schedule_flush<F, Fut>(&mut self, file: &str, options: FlushOptions, on_due: F) -> bool
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if file.is_empty() {
            return false;
        }

        let snapshot = self.snapshot();
        if !options.force && self.last_snapshot.as_deref() == Some(snapshot.as_str()) {
            tracing::debug!("Decorations unchanged, skipping flush for {}", file);
            return false;
        }
        self.last_snapshot = Some(snapshot);

        self.debounce.schedule(options.delay, on_due(file.to_string()));
        true
    }

    /// Apply `file`'s decorations to every visible view showing it.
    ///
    /// Returns the number of views updated.
    pub fn flush(&self, file: &str, editor: &dyn EditorHost) -> usize {
        let decorations = self.decorations_for(file);
        let mut updated = 0;
        for view in editor.visible_views().into_iter().filter(|v| v.path == file) {
            editor.set_decorations(view.id, decorations);
            updated += 1;
        }
        updated
    }

    /// Drop every decoration and clear all visible views.
    pub fn clear_all(&mut self, editor: Option<&dyn EditorHost>) {
        self.debounce.cancel();
        self.records.clear();
        // Views are blank now and match no earlier snapshot.
        self.last_snapshot = None;
        if let Some(editor) = editor {
            for view in editor.visible_views() {
                editor.set_decorations(view.id, &[]);
            }
        }
    }

    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
    }

    fn snapshot(&self) -> String {
        serde_json::to_string(&self.records).unwrap_or_else(|_| "{}".to_string())
    }
}
