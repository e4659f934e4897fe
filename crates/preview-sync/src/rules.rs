//! Decision rules mapping a classified file and the current config to actions.
//!
//! All rules are pure. Callers re-evaluate them on every event because the
//! config changes between server restarts.

use crate::classify::{classify, has_structural_tags};
use crate::config::PreviewConfig;

/// Why a navigation was or was not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Navigate to the file
    Go,
    /// File or text missing, navigation disabled, or not a page
    Skip,
    /// A page without closing `head`/`body`/`html` tags
    MissingTags,
}

/// Full navigation decision, keeping the missing-tags case apart so callers
/// can report it.
pub fn navigation(file: Option<&str>, text: Option<&str>, config: &PreviewConfig) -> Navigation {
    let (Some(file), Some(text)) = (file, text) else {
        return Navigation::Skip;
    };
    if file.is_empty() || text.is_empty() {
        return Navigation::Skip;
    }
    if config.navigate == Some(false) {
        return Navigation::Skip;
    }
    if !classify(file).is_page() {
        return Navigation::Skip;
    }
    if !has_structural_tags(text) {
        return Navigation::MissingTags;
    }
    if config.navigate == Some(true) {
        Navigation::Go
    } else {
        Navigation::Skip
    }
}

/// Should an edit or focus change on `file` navigate the browser.
pub fn should_navigate(file: Option<&str>, text: Option<&str>, config: &PreviewConfig) -> bool {
    navigation(file, text, config) == Navigation::Go
}

/// Highlighting is opt-in and limited to markup files.
pub fn should_highlight(file: &str, config: &PreviewConfig) -> bool {
    config.highlight == Some(true) && classify(file).is_markup
}

/// Stylesheet injection is on unless explicitly disabled.
pub fn should_inject_css(config: &PreviewConfig) -> bool {
    config.inject_css != Some(false)
}

/// Body injection is off unless explicitly enabled.
pub fn should_inject_body(config: &PreviewConfig) -> bool {
    config.inject_body == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(navigate: Option<bool>) -> PreviewConfig {
        PreviewConfig {
            navigate,
            ..Default::default()
        }
    }

    #[test]
    fn test_should_navigate_examples() {
        let on = config(Some(true));
        let off = config(Some(false));

        assert!(should_navigate(Some("a.html"), Some("<html></html>"), &on));
        assert!(!should_navigate(Some("a.html"), Some("<div></div>"), &on));
        assert!(!should_navigate(Some("a.html"), Some("<html></html>"), &off));
    }

    #[test]
    fn test_navigation_requires_explicit_opt_in() {
        assert_eq!(
            navigation(Some("a.html"), Some("<html></html>"), &config(None)),
            Navigation::Skip
        );
    }

    #[test]
    fn test_navigation_missing_inputs() {
        let on = config(Some(true));
        assert_eq!(navigation(None, Some("<html></html>"), &on), Navigation::Skip);
        assert_eq!(navigation(Some("a.html"), None, &on), Navigation::Skip);
        assert_eq!(navigation(Some("a.html"), Some(""), &on), Navigation::Skip);
    }

    #[test]
    fn test_navigation_pages_only() {
        let on = config(Some(true));
        assert_eq!(
            navigation(Some("index.php"), Some("</body>"), &on),
            Navigation::Go
        );
        assert_eq!(
            navigation(Some("style.css"), Some("</body>"), &on),
            Navigation::Skip
        );
        assert_eq!(
            navigation(Some("index.php"), Some("<?php echo 1;"), &on),
            Navigation::MissingTags
        );
    }

    #[test]
    fn test_opt_out_wins_over_missing_tags() {
        assert_eq!(
            navigation(Some("a.html"), Some("<div></div>"), &config(Some(false))),
            Navigation::Skip
        );
    }

    #[test]
    fn test_should_highlight() {
        let on = PreviewConfig {
            highlight: Some(true),
            ..Default::default()
        };
        assert!(should_highlight("a.html", &on));
        assert!(!should_highlight("a.php", &on));
        assert!(!should_highlight("a.html", &PreviewConfig::default()));
    }

    #[test]
    fn test_injection_defaults() {
        let default = PreviewConfig::default();
        assert!(should_inject_css(&default));
        assert!(!should_inject_body(&default));

        let flipped = PreviewConfig {
            inject_css: Some(false),
            inject_body: Some(true),
            ..Default::default()
        };
        assert!(!should_inject_css(&flipped));
        assert!(should_inject_body(&flipped));
    }
}
