use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::parse_directory;

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a preview session driven over stdio
    ///
    /// Reads editor events as JSON lines on stdin and writes decorations,
    /// status changes, and messages as JSON lines on stdout.
    Serve(ServeArgs),

    /// Print the merged configuration
    ///
    /// Merges editor settings with the project config file the same way a
    /// server start does, and prints the result as JSON.
    Check(CheckArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// File or directory to open
    ///
    /// A directory becomes the served root for this run. A file is opened
    /// in the browser once the server is up.
    #[arg(value_name = "TARGET")]
    pub target: Option<PathBuf>,

    /// Workspace root
    ///
    /// Without one, the session runs in single-file mode and serves the
    /// directory of the active document.
    #[arg(short, long, value_name = "DIR", value_parser = parse_directory)]
    pub workspace: Option<PathBuf>,

    /// Editor settings JSON file
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Wait for a start or toggle command instead of starting immediately
    #[arg(long)]
    pub no_start: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Workspace root searched for `.previewrc.json` or `preview.config.json`
    #[arg(short, long, value_name = "DIR", value_parser = parse_directory)]
    pub workspace: Option<PathBuf>,

    /// Editor settings JSON file
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}
