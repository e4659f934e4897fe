//! Diagnostic reports from the background lint/parse worker.
//!
//! The worker sends JSON text:
//!
//! ```json
//! { "report": { "results": [ { "messages": [ { "message": "...", "ruleId": "...", "line": 3 } ] } ] } }
//! ```
//!
//! Messages that do not parse are dropped by the caller.

use crate::decorations::AnnotationEntry;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkerPayload {
    #[serde(default)]
    pub report: Option<LintReport>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LintReport {
    #[serde(default)]
    pub results: Option<Vec<LintResult>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LintResult {
    #[serde(default)]
    pub messages: Vec<LintMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintMessage {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub rule_id: Option<String>,
    /// 1-based; missing for whole-file problems
    #[serde(default)]
    pub line: Option<u32>,
}

/// What a worker report asks the decoration store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportAction {
    /// Zero results: remove every decoration for the tracked file
    Clear,
    /// Replace the tracked file's decorations with these entries
    Replace(Vec<AnnotationEntry>),
}

impl WorkerPayload {
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        WorkerPayload::deserialize(value)
    }

    /// `None` when the payload carries no report results.
    pub fn action(&self) -> Option<ReportAction> {
        let results = self.report.as_ref()?.results.as_ref()?;
        let Some(first) = results.first() else {
            return Some(ReportAction::Clear);
        };

        Some(ReportAction::Replace(
            first.messages.iter().map(LintMessage::to_annotation).collect(),
        ))
    }
}

impl LintMessage {
    pub fn to_annotation(&self) -> AnnotationEntry {
        AnnotationEntry {
            display_text: format!("// {}", self.message),
            source_line: self.line.unwrap_or(1).max(1),
        }
    }
}
