//! Relay of worker and preview-server log messages into the terminal.
//!
//! Each source may repeat a message across internal retries. The bridge keeps
//! the last relayed message per source and drops a message equal (by value)
//! to it. The terminal itself drops adjacent repeats of the joined text, which
//! catches the same line arriving from two different sources; both filters
//! are needed.

use crate::terminal::Terminal;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageSource {
    Worker,
    PreviewServer,
}

#[derive(Debug, Default)]
pub struct MessageBridge {
    last: HashMap<MessageSource, Value>,
}

impl MessageBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward `message` to the terminal unless it is empty or repeats the
    /// previous message from `source`.
    ///
    /// Returns `true` if the message was forwarded.
    pub fn relay(&mut self, source: MessageSource, message: &Value, terminal: &mut Terminal) -> bool {
        let Some(text) = message_text(message) else {
            return false;
        };
        if self.last.get(&source) == Some(message) {
            tracing::debug!(?source, "Dropped duplicate message");
            return false;
        }

        terminal.write(&[text.as_str()]);
        self.last.insert(source, message.clone());
        true
    }

    /// Forget the remembered messages (on server shutdown).
    pub fn reset(&mut self) {
        self.last.clear();
    }
}

/// Printable text of a message, or `None` if it is structurally empty.
///
/// Accepts a bare string, an array of strings, or an object whose `msg`
/// field is one of those.
pub fn message_text(message: &Value) -> Option<String> {
    let text = match message {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) => match map.get("msg") {
            Some(msg @ (Value::String(_) | Value::Array(_))) => return message_text(msg),
            _ => return None,
        },
        _ => return None,
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
