use crate::config::{ConfigFileOverrides, EditorSettings, PreviewConfig, CONFIG_FILE_NAMES};
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Format as _, Json, Serialized},
    Figment,
};
use std::path::{Path, PathBuf};

impl PreviewConfig {
    /// Merge editor settings with the project config file found in `workspace`.
    ///
    /// Without a workspace only the editor settings apply.
    pub fn load(settings: &EditorSettings, workspace: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Serialized::defaults(settings));

        if let Some(path) = workspace.and_then(find_config_file) {
            tracing::debug!("Reading preview config from {}", path.display());
            let overrides = ConfigFileOverrides::load(&path)?;
            figment = figment.merge(Serialized::defaults(overrides));
        }

        figment.extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: "Check the editor settings and config file field types".to_string(),
            }
            .into()
        })
    }
}

impl ConfigFileOverrides {
    /// Read the overridable subset from a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        Figment::from(Json::file(path)).extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: path.display().to_string(),
                value: e.to_string(),
                hint: "The config file must be a JSON object".to_string(),
            }
            .into()
        })
    }
}

impl EditorSettings {
    /// Load editor settings from a JSON file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }

        Figment::from(Json::file(path)).extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "settings".to_string(),
                value: e.to_string(),
                hint: "Check the settings file syntax and field types".to_string(),
            }
            .into()
        })
    }
}

/// First existing config file in `workspace`, if any.
pub fn find_config_file(workspace: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| workspace.join(name))
        .find(|path| path.is_file())
}
