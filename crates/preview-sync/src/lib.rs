//! preview-sync - keeps a live browser preview in step with an editor.
//!
//! Editor events (focus changes, selection changes, edits, saves) are turned
//! into preview commands: navigate, reload, body updates, and highlights.
//! Diagnostics from a background lint worker become inline editor
//! decorations.
//!
//! # Architecture
//!
//! Pure building blocks:
//!
//! - [`classify`] - file classification by extension, structural tag checks
//! - [`rules`] - decisions derived from a file and the current config
//! - [`page`] - two-slot buffer gating body updates on stable edits
//! - [`decorations`] - annotation store with a debounced flush
//! - [`bridge`] / [`terminal`] - message relay with two duplicate filters
//! - [`lifecycle`] - off / loading / on server state machine
//!
//! The [`session`] module owns all of them in one task and talks to the
//! outside world through the traits in [`host`]. The crate ships an SSE
//! preview server ([`server`]) and a JSON-lines editor bridge ([`stdio`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use preview_sync::config::EditorSettings;
//! use preview_sync::server::SsePreviewServer;
//! use preview_sync::session::SessionHandle;
//! use preview_sync::terminal::ConsoleTerminal;
//! use std::sync::Arc;
//!
//! # async fn run() -> preview_sync::Result<()> {
//! let handle = SessionHandle::spawn(
//!     Arc::new(SsePreviewServer::new()),
//!     None,
//!     Box::new(ConsoleTerminal::new("[preview]", false)),
//!     EditorSettings::default(),
//! );
//! handle.start(Some("/srv/site/index.html".into())).await?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod decorations;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod logger;
pub mod page;
pub mod rules;
pub mod server;
pub mod session;
pub mod stdio;
pub mod terminal;
pub mod ui;
pub mod worker;

pub use error::{ConfigError, Result, ResultExt, SyncError};
