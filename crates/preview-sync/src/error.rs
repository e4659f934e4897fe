//! Error handling for the preview synchronization engine.
//!
//! This module provides a hierarchical error type system using `thiserror`.
//! Each variant is designed to be actionable and carries enough context for
//! the user to resolve the issue.
//!
//! # Architecture
//!
//! - **Top-level errors** (`SyncError`) represent broad categories of failures
//! - **Domain-specific errors** (`ConfigError`) provide detailed context
//! - **Error conversion** is automatic via `#[from]` attributes
//! - **Context helpers** allow attaching additional information to errors
//!
//! Stale or duplicate signals are not errors: they are suppressed where they
//! arrive and only show up in debug logs.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type.
///
/// Returned by session operations and CLI commands. Converts automatically
/// from the domain-specific errors below.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors (invalid config file, bad values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Preview server failed to start, stop, or bind
    #[error("Server error: {0}")]
    Server(String),

    /// A lifecycle transition that the state machine does not allow
    #[error("Invalid lifecycle transition: {0}")]
    Lifecycle(String),

    /// The session task has stopped and no longer accepts requests
    #[error("Session is closed\n\nHint: Create a new session after dispose()")]
    SessionClosed,

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file doesn't exist at the expected location
    #[error("Settings file not found: {}\n\nHint: Pass an existing JSON file to --settings", .0.display())]
    NotFound(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `SyncError` as the default error type.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Add a file path to the error context.
    ///
    /// Turns a `NotFound` I/O error into [`SyncError::FileNotFound`].
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Add a helpful hint to the error context.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error with a custom message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<SyncError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: SyncError = e.into();
            match err {
                SyncError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    SyncError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: SyncError = e.into();
            SyncError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: SyncError = e.into();
            SyncError::Custom(format!("{}: {}", msg, err))
        })
    }
}

/// Convert a `SyncError` into a miette report for the binary entry point.
pub fn sync_error_to_miette(err: SyncError) -> miette::Report {
    match err {
        SyncError::Config(e) => miette::miette!("Configuration error: {}", e),
        SyncError::Server(msg) => miette::miette!(
            "Preview server error: {}\n\nHint: Check that the port is free or set \"port\" in the editor settings",
            msg
        ),
        _ => miette::miette!("{}", err),
    }
}
