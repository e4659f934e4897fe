//! Preview configuration with two-source loading.
//!
//! Workspace-level editor settings are merged with a per-project config file.
//! The file may only override `root`, `injectBody`, `highlight`, and `debug`.
//! Priority: config file subset > editor settings > defaults
//!
//! The merged [`PreviewConfig`] is recomputed on every server start and never
//! persisted.

mod defaults;
mod loading;
mod tests;

use serde::{Deserialize, Serialize};

pub use defaults::*;
pub use loading::find_config_file;

/// Config file names searched in the workspace root, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".previewrc.json", "preview.config.json"];

/// Merged configuration snapshot used by the decision rules and the server.
///
/// The four behaviour flags are tri-state: `Some(false)` is an explicit
/// opt-out and differs from "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewConfig {
    /// Navigate the browser to markup files as they become active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate: Option<bool>,

    /// Highlight the element under the cursor (markup only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,

    /// Inject stylesheets instead of reloading (default on)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_css: Option<bool>,

    /// Push body updates while typing (default off)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_body: Option<bool>,

    /// Served root, relative to the workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Write start diagnostics to the terminal
    #[serde(default)]
    pub debug: bool,

    /// Show the terminal when the server starts
    #[serde(default)]
    pub open_terminal: bool,

    /// Preferred port; the next ten are tried when busy
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            navigate: None,
            highlight: None,
            inject_css: None,
            inject_body: None,
            root: None,
            debug: false,
            open_terminal: false,
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Workspace-level settings supplied by the editor.
///
/// Every field is optional; unset fields fall through to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_css: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_body: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_terminal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// The subset of keys a project config file may override.
///
/// Other keys in the file are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_body: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl PreviewConfig {
    /// Served root with leading separators removed, or `""`.
    pub fn root_dir(&self) -> &str {
        self.root
            .as_deref()
            .map(|r| r.trim_start_matches(['/', '\\']))
            .unwrap_or("")
    }
}
