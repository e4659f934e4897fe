//! preview-sync entry point.
//!
//! Parses arguments, initializes logging, and dispatches to a command.

use clap::Parser;
use miette::Result;
use preview_sync::{cli, commands, error, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Serve(serve_args) => commands::serve_execute(serve_args, args.no_color).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
    };

    // Convert errors to miette diagnostics for readable reporting
    result.map_err(error::sync_error_to_miette)
}
