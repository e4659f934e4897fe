//! Terminal status output for the CLI.
//!
//! Everything here writes to stderr; stdout carries the editor protocol.
//!
//! # Examples
//!
//! ```no_run
//! use preview_sync::ui;
//!
//! let spinner = ui::Spinner::new("Starting preview server...");
//! spinner.finish("Preview running at http://127.0.0.1:5555/");
//!
//! ui::warning("No workspace given, serving the active file's directory");
//! ```

mod messages;
mod spinner;

pub use messages::{error, info, success, warning};
pub use spinner::Spinner;

/// Whether stderr is an interactive terminal outside CI.
///
/// Spinners are only drawn when this holds.
pub fn is_interactive() -> bool {
    let ci = ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var(var).is_ok());

    !ci && console::user_attended_stderr()
}
