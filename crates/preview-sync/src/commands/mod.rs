//! Command implementations for the preview-sync CLI.
//!
//! - [`serve`] - Preview session driven by an editor over stdio
//! - [`check`] - Configuration inspection
//!
//! Each command provides an `execute` function that takes the parsed
//! command arguments and returns a Result.

pub mod check;
pub mod serve;

pub use check::execute as check_execute;
pub use serve::execute as serve_execute;
