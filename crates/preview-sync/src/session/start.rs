//! Start sequence: config merge, root resolution, and the server start call.
//!
//! Runs outside the session task so that requests arriving mid-start still
//! see the `loading` state. The result travels back to the session as a
//! [`StartReport`].

use crate::classify::classify;
use crate::config::{EditorSettings, PreviewConfig};
use crate::error::Result;
use crate::host::{relative_path, EditorHost, FileKind, PreviewServer, ServerInfo, StartOptions};
use crate::rules::should_inject_body;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) const NO_WORKSPACE_NOTICE: &str =
    "No workspace found! You probably opened a single file instead of a folder.";
pub(crate) const NO_FILE_NOTICE: &str = "Could not detect a valid file.";

/// Everything the session adopts once the server is up.
#[derive(Debug, Clone)]
pub(crate) struct StartPlan {
    pub config: PreviewConfig,
    pub options: StartOptions,
    /// Workspace + root; `None` in single-file mode, which disables navigation
    pub root_absolute: Option<PathBuf>,
    /// Absolute path of the opened file, seeds the navigation memo
    pub opened_file: Option<String>,
    pub debug_lines: Vec<Vec<String>>,
}

pub(crate) enum Plan {
    Ready(StartPlan),
    Abort,
}

pub(crate) enum StartOutcome {
    Started { plan: Box<StartPlan>, info: ServerInfo },
    Aborted,
}

pub(crate) struct StartReport {
    pub notices: Vec<String>,
    pub outcome: Result<StartOutcome>,
}

pub(crate) async fn run_start(
    server: Arc<dyn PreviewServer>,
    editor: Option<Arc<dyn EditorHost>>,
    settings: EditorSettings,
    target: Option<PathBuf>,
) -> StartReport {
    let mut notices = Vec::new();

    let plan = match plan_start(editor.as_deref(), &settings, target.as_deref(), &mut notices).await {
        Ok(Plan::Ready(plan)) => plan,
        Ok(Plan::Abort) => {
            return StartReport {
                notices,
                outcome: Ok(StartOutcome::Aborted),
            }
        }
        Err(e) => {
            return StartReport {
                notices,
                outcome: Err(e),
            }
        }
    };

    let outcome = server
        .start(plan.options.clone())
        .await
        .map(|info| StartOutcome::Started {
            plan: Box::new(plan),
            info,
        });

    StartReport { notices, outcome }
}

pub(crate) async fn plan_start(
    editor: Option<&dyn EditorHost>,
    settings: &EditorSettings,
    target: Option<&Path>,
    notices: &mut Vec<String>,
) -> Result<Plan> {
    let workspace = editor.and_then(|e| e.workspace_root());
    let config = PreviewConfig::load(settings, workspace.as_deref())?;
    let inject_body = should_inject_body(&config);

    let Some(workspace) = workspace else {
        notices.push(NO_WORKSPACE_NOTICE.to_string());

        let Some(document) = editor.and_then(|e| e.active_document()) else {
            notices.push(NO_FILE_NOTICE.to_string());
            return Ok(Plan::Abort);
        };

        let path = Path::new(&document.path);
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let open = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        return Ok(Plan::Ready(StartPlan {
            options: StartOptions {
                config: config.clone(),
                inject_body,
                root,
                workspace: None,
                open,
                non_interactive: false,
            },
            config,
            root_absolute: None,
            opened_file: Some(document.path),
            debug_lines: Vec::new(),
        }));
    };

    // A directory target becomes the served root for this run only.
    let mut temp_root = None;
    if let (Some(target), Some(editor)) = (target, editor) {
        if editor.stat(target).await == Some(FileKind::Directory) {
            temp_root = relative_path(target, &workspace);
        }
    }

    let root = temp_root
        .clone()
        .unwrap_or_else(|| config.root_dir().to_string());
    let root_absolute = workspace.join(&root);

    let mut debug_lines = Vec::new();
    if config.debug {
        debug_lines.push(vec![
            "DEBUG:".to_string(),
            "\"workspace\", \"root\" and \"open\" are passed to the preview server".to_string(),
        ]);
        debug_lines.push(vec!["Workspace:".to_string(), workspace.display().to_string()]);
        debug_lines.push(vec!["Root:".to_string(), root.clone()]);
        debug_lines.push(vec![
            "Absolute (workspace + root):".to_string(),
            root_absolute.display().to_string(),
        ]);
        if let Some(target) = target {
            debug_lines.push(vec!["File:".to_string(), target.display().to_string()]);
        }
    }

    let (open, opened_file) = match target {
        Some(target) if temp_root.is_none() => {
            let open = relative_path(target, &root_absolute).map(|file| preview_path(&file));
            (open, Some(target.to_string_lossy().into_owned()))
        }
        _ => (None, None),
    };

    if config.debug {
        debug_lines.push(vec!["Open:".to_string(), open.clone().unwrap_or_default()]);
    }

    Ok(Plan::Ready(StartPlan {
        options: StartOptions {
            config: config.clone(),
            inject_body,
            root: PathBuf::from(&root),
            workspace: Some(workspace),
            open,
            non_interactive: true,
        },
        config,
        root_absolute: Some(root_absolute),
        opened_file,
        debug_lines,
    }))
}

/// Files the browser cannot render directly are opened through the
/// server's `.preview` page.
pub(crate) fn preview_path(file: &str) -> String {
    let has_extension = Path::new(file).extension().is_some();
    if has_extension && !classify(file).is_page() {
        format!("{}.preview", file)
    } else {
        file.to_string()
    }
}
