//! Logging infrastructure.
//!
//! Structured logging via the `tracing` ecosystem. Output always goes to
//! stderr: stdout is reserved for the JSON-lines editor protocol.
//!
//! # Example
//!
//! ```rust,no_run
//! use preview_sync::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("Preview server started");
//! debug!("Dropped duplicate message");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "preview_sync=debug";
const QUIET_FILTER: &str = "preview_sync=error";
const DEFAULT_FILTER: &str = "preview_sync=info";

/// Initialize the tracing subscriber.
///
/// Should be called once at the start of the program, before any logging occurs.
///
/// The level is picked in this order:
/// 1. `verbose`: DEBUG for this crate
/// 2. `quiet`: ERROR only
/// 3. `RUST_LOG` environment variable
/// 4. INFO for this crate
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(build_filter(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal capabilities of stderr decide.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_verbose() {
        let filter = build_filter(true, false);
        assert!(filter.to_string().contains("preview_sync=debug"));
    }

    #[test]
    fn test_env_filter_quiet() {
        let filter = build_filter(false, true);
        assert!(filter.to_string().contains("preview_sync=error"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logger(false, true, true);
        init_logger(true, false, true);
    }
}
