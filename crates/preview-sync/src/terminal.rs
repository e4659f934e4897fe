//! Pseudo-terminal output with adjacent-duplicate suppression.
//!
//! [`Terminal`] joins the parts of a write with spaces and drops a write
//! whose joined text equals the previous write. This is the last of two
//! duplicate filters: the message bridge drops repeats per source, this layer
//! drops repeats that reach the terminal through different channels.

use crate::host::TerminalSink;
use owo_colors::OwoColorize;

pub struct Terminal {
    sink: Box<dyn TerminalSink>,
    last: Option<String>,
}

impl Terminal {
    pub fn new(sink: Box<dyn TerminalSink>) -> Self {
        Self { sink, last: None }
    }

    /// Write one line made of `parts` joined by spaces.
    ///
    /// Returns `false` if the line was empty or repeated the previous write.
    pub fn write(&mut self, parts: &[&str]) -> bool {
        let text = parts.join(" ");
        if text.trim().is_empty() {
            return false;
        }
        if self.last.as_deref() == Some(text.as_str()) {
            tracing::debug!("Dropped repeated terminal line");
            return false;
        }

        self.sink.write_line(&text);
        self.last = Some(text);
        true
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal").field("last", &self.last).finish()
    }
}

/// Terminal sink writing to stderr with a dimmed prefix.
#[derive(Debug, Clone)]
pub struct ConsoleTerminal {
    prefix: String,
    color: bool,
}

impl ConsoleTerminal {
    pub fn new(prefix: impl Into<String>, color: bool) -> Self {
        Self {
            prefix: prefix.into(),
            color,
        }
    }
}

impl TerminalSink for ConsoleTerminal {
    fn write_line(&mut self, text: &str) {
        if self.color {
            eprintln!("{} {}", self.prefix.dimmed(), text);
        } else {
            eprintln!("{} {}", self.prefix, text);
        }
    }
}
