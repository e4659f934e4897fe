#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PreviewConfig::load(&EditorSettings::default(), None).unwrap();
        assert_eq!(config, PreviewConfig::default());
        assert_eq!(config.port, 5555);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.inject_body.is_none());
    }

    #[test]
    fn test_settings_apply_without_workspace() {
        let settings = EditorSettings {
            navigate: Some(true),
            inject_css: Some(false),
            port: Some(8080),
            ..Default::default()
        };

        let config = PreviewConfig::load(&settings, None).unwrap();
        assert_eq!(config.navigate, Some(true));
        assert_eq!(config.inject_css, Some(false));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_config_file_overrides_subset() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("preview.config.json"),
            r#"{ "root": "public", "injectBody": true, "highlight": true, "debug": true,
                 "navigate": false, "port": 9999 }"#,
        )
        .unwrap();

        let settings = EditorSettings {
            navigate: Some(true),
            highlight: Some(false),
            root: Some("src".to_string()),
            ..Default::default()
        };

        let config = PreviewConfig::load(&settings, Some(temp.path())).unwrap();
        assert_eq!(config.root.as_deref(), Some("public"));
        assert_eq!(config.inject_body, Some(true));
        assert_eq!(config.highlight, Some(true));
        assert!(config.debug);
        // Keys outside the subset stay with the editor settings
        assert_eq!(config.navigate, Some(true));
        assert_eq!(config.port, 5555);
    }

    #[test]
    fn test_rc_file_takes_precedence_over_config_json() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".previewrc.json"), r#"{ "root": "rc" }"#).unwrap();
        fs::write(temp.path().join("preview.config.json"), r#"{ "root": "json" }"#).unwrap();

        let found = find_config_file(temp.path()).unwrap();
        assert!(found.ends_with(".previewrc.json"));

        let config = PreviewConfig::load(&EditorSettings::default(), Some(temp.path())).unwrap();
        assert_eq!(config.root.as_deref(), Some("rc"));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("preview.config.json"), r#"{ "injectBody": "yes please" }"#)
            .unwrap();

        let err = PreviewConfig::load(&EditorSettings::default(), Some(temp.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid value"));
    }

    #[test]
    fn test_root_dir_trims_leading_separators() {
        let config = PreviewConfig {
            root: Some("/public".to_string()),
            ..Default::default()
        };
        assert_eq!(config.root_dir(), "public");
        assert_eq!(PreviewConfig::default().root_dir(), "");
    }

    #[test]
    fn test_camel_case_serialization() {
        let config = PreviewConfig {
            inject_body: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json.get("injectBody"), Some(&serde_json::Value::Bool(true)));
        assert!(json.get("inject_body").is_none());
        assert!(json.get("navigate").is_none());
    }

    #[test]
    fn test_editor_settings_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = EditorSettings::load(Some(&temp.path().join("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Settings file not found"));
    }

    #[test]
    fn test_editor_settings_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, r#"{ "injectBody": true, "port": 4000 }"#).unwrap();

        let settings = EditorSettings::load(Some(&path)).unwrap();
        assert_eq!(settings.inject_body, Some(true));
        assert_eq!(settings.port, Some(4000));
    }
}
