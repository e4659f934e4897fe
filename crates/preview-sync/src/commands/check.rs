//! Check command implementation.
//!
//! Loads editor settings and the project config file, merges them the way a
//! server start does, and prints the result.

use crate::cli::CheckArgs;
use crate::config::{find_config_file, EditorSettings, PreviewConfig};
use crate::error::Result;
use crate::rules::{should_inject_body, should_inject_css};
use crate::ui;

/// Execute the check command.
///
/// The merged config goes to stdout as JSON; the summary goes to stderr.
///
/// # Errors
///
/// Returns errors for a missing settings file or an invalid config file.
pub async fn execute(args: CheckArgs) -> Result<()> {
    let settings = EditorSettings::load(args.settings.as_deref())?;
    let workspace = args.workspace.as_deref();

    match workspace {
        Some(workspace) => match find_config_file(workspace) {
            Some(path) => ui::info(&format!("Using config file {}", path.display())),
            None => ui::warning("No .previewrc.json or preview.config.json found, using editor settings only"),
        },
        None => ui::warning("No workspace given, single-file mode ignores project config files"),
    }

    let config = PreviewConfig::load(&settings, workspace)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    ui::info(&format!("Root: {}", display_root(&config)));
    ui::info(&format!("CSS injection: {}", on_off(should_inject_css(&config))));
    ui::info(&format!("Body injection: {}", on_off(should_inject_body(&config))));
    ui::success("Configuration is valid!");

    Ok(())
}

fn display_root(config: &PreviewConfig) -> &str {
    match config.root_dir() {
        "" => "(workspace)",
        root => root,
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
