//! Command-line interface definition.
//!
//! # Command Structure
//!
//! - `preview-sync serve` - Run a preview session driven by an editor over stdio
//! - `preview-sync check` - Print the merged configuration

mod commands;
mod validation;

use clap::Parser;

pub use commands::{CheckArgs, Command, ServeArgs};
pub use validation::parse_directory;

/// preview-sync - Keep a live browser preview in step with your editor
#[derive(Parser, Debug)]
#[command(
    name = "preview-sync",
    version,
    about = "Keep a live browser preview in step with your editor",
    long_about = "preview-sync serves a folder over HTTP and keeps connected browsers in step\n\
                  with editor events: reloads on save, navigation on focus changes, live\n\
                  body updates while typing, and inline diagnostics from a lint worker."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows every dropped, suppressed, or deferred signal.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
