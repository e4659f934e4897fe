//! File classification by extension and markup inspection.

/// What kind of file a path names, by exact, case-sensitive suffix.
///
/// Derived on every call; never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileClassification {
    pub is_markup: bool,
    pub is_server_page: bool,
    pub is_stylesheet: bool,
    pub is_script: bool,
}

impl FileClassification {
    /// Markup and server pages are the files the browser can navigate to
    /// and receive body injections for.
    pub fn is_page(&self) -> bool {
        self.is_markup || self.is_server_page
    }
}

/// Classify a path by its extension.
///
/// Unmatched extensions (including `.HTML`) classify as all-false.
pub fn classify(path: &str) -> FileClassification {
    FileClassification {
        is_markup: path.ends_with(".html"),
        is_server_page: path.ends_with(".php"),
        is_stylesheet: path.ends_with(".css"),
        is_script: path.ends_with(".js"),
    }
}

const CLOSING_TAGS: [&str; 3] = ["</head>", "</body>", "</html>"];

/// True if `text` contains a closing `head`, `body`, or `html` tag, ignoring case.
pub fn has_structural_tags(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    CLOSING_TAGS.iter().any(|tag| lower.contains(tag))
}

/// Inner content of the document's `<body>` element.
///
/// Returns `None` when the text has no complete body element. Matching is
/// ASCII case-insensitive and tolerates attributes on the opening tag.
pub fn extract_body(text: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets identical to `text`.
    let lower = text.to_ascii_lowercase();

    let mut search_from = 0;
    let open_start = loop {
        let candidate = search_from + lower[search_from..].find("<body")?;
        let next = lower.as_bytes().get(candidate + 5).copied();
        // `<bodyguard>` is not a body tag
        if matches!(next, Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'/')) {
            break candidate;
        }
        search_from = candidate + 5;
    };

    let content_start = open_start + lower[open_start..].find('>')? + 1;
    let content_end = content_start + lower[content_start..].rfind("</body>")?;
    Some(&text[content_start..content_end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_extension() {
        let html = classify("/site/index.html");
        assert!(html.is_markup);
        assert!(!html.is_server_page && !html.is_stylesheet && !html.is_script);

        let php = classify("/site/index.php");
        assert!(php.is_server_page);
        assert!(!php.is_markup && !php.is_stylesheet && !php.is_script);

        let css = classify("style.css");
        assert!(css.is_stylesheet);
        assert!(!css.is_markup && !css.is_server_page && !css.is_script);

        let js = classify("app.js");
        assert!(js.is_script);
        assert!(!js.is_markup && !js.is_server_page && !js.is_stylesheet);
    }

    #[test]
    fn test_classify_is_case_sensitive_and_exact() {
        assert_eq!(classify("INDEX.HTML"), FileClassification::default());
        assert_eq!(classify("index.htm"), FileClassification::default());
        assert_eq!(classify("app.jsx"), FileClassification::default());
        assert_eq!(classify("README.md"), FileClassification::default());
        assert_eq!(classify(""), FileClassification::default());
    }

    #[test]
    fn test_is_page() {
        assert!(classify("a.html").is_page());
        assert!(classify("a.php").is_page());
        assert!(!classify("a.css").is_page());
    }

    #[test]
    fn test_has_structural_tags() {
        assert!(has_structural_tags("<html></html>"));
        assert!(has_structural_tags("<head>\n</HEAD>"));
        assert!(has_structural_tags("line one\n</Body>\n"));
        assert!(!has_structural_tags("<div></div>"));
        assert!(!has_structural_tags("<body>"));
        assert!(!has_structural_tags(""));
    }

    #[test]
    fn test_extract_body() {
        assert_eq!(extract_body("<html><body>hi</body></html>"), Some("hi"));
        assert_eq!(
            extract_body("<BODY class=\"x\">\n  <p>a</p>\n</BODY>"),
            Some("\n  <p>a</p>\n")
        );
        assert_eq!(extract_body("<bodyguard>x</bodyguard><body>y</body>"), Some("y"));
        assert_eq!(extract_body("<div>no body</div>"), None);
        assert_eq!(extract_body("<body>unterminated"), None);
    }
}
