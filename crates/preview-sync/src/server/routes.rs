//! HTTP routes: SSE endpoint, client script, and static files with the
//! client script injected into HTML.

use super::state::{PreviewEvent, SharedState};
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    routing::get,
    Router,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::convert::Infallible;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};

pub const SSE_PATH: &str = "/__preview_sse__";
pub const CLIENT_PATH: &str = "/__preview_client__.js";
const PREVIEW_SUFFIX: &str = ".preview";

/// Characters a browser escapes in `location.pathname`.
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const CLIENT_SCRIPT: &str = include_str!("../../assets/preview-client.js");

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(SSE_PATH, get(handle_sse))
        .route(CLIENT_PATH, get(handle_client_script))
        .route("/favicon.ico", get(handle_favicon))
        .fallback(handle_request)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    state.log(format!("Client {} connected", id));
    state.broadcast(&PreviewEvent::Connected { id });

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
}

async fn handle_client_script(State(state): State<SharedState>) -> impl IntoResponse {
    let script = CLIENT_SCRIPT.replace(
        "__INJECT_BODY__",
        if state.inject_body { "true" } else { "false" },
    );
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        script,
    )
}

async fn handle_favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

async fn handle_request(State(state): State<SharedState>, uri: Uri) -> Response {
    let decoded = percent_decode_str(uri.path()).decode_utf8_lossy();
    let path = decoded.as_ref();

    let Some(relative) = sanitize(path) else {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    };

    if let Some(source) = path.strip_suffix(PREVIEW_SUFFIX) {
        return serve_preview_page(&state, source).await;
    }

    let mut file_path = state.serve_dir.join(&relative);
    if tokio::fs::metadata(&file_path)
        .await
        .is_ok_and(|m| m.is_dir())
    {
        file_path = file_path.join("index.html");
    }

    match tokio::fs::read(&file_path).await {
        Ok(content) => {
            let content_type = determine_content_type(&file_path);
            let content = if content_type.starts_with("text/html") {
                inject_client_script(&String::from_utf8_lossy(&content)).into_bytes()
            } else {
                content
            };
            (
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                content,
            )
                .into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, format!("File not found: {}", path)).into_response(),
    }
}

/// Render a non-page file as escaped text inside a live page.
async fn serve_preview_page(state: &SharedState, source: &str) -> Response {
    let Some(relative) = sanitize(source) else {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    };

    match tokio::fs::read_to_string(state.serve_dir.join(&relative)).await {
        Ok(text) => {
            let html = format!(
                "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<pre>{text}</pre>\n</body>\n</html>\n",
                title = escape_html(source.trim_start_matches('/')),
                text = escape_html(&text),
            );
            (
                [
                    (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                inject_client_script(&html),
            )
                .into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, format!("File not found: {}", source)).into_response(),
    }
}

/// Percent-encode a decoded URL path the way browsers report it.
pub(super) fn encode_url_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ESCAPES).to_string()
}

/// Root-relative filesystem path for a URL path, `None` if it climbs out of
/// the served root.
fn sanitize(url_path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(url_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(relative)
}

/// Insert the client script before the last `</body>`, or append it.
fn inject_client_script(html: &str) -> String {
    let script_tag = format!(r#"<script src="{}"></script>"#, CLIENT_PATH);

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script_tag.len() + 4);
        result.push_str(&html[..pos]);
        result.push_str(&script_tag);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result;
    }

    format!("{}\n{}", html, script_tag)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn determine_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        // Server pages are served as written; there is no interpreter.
        "html" | "htm" | "php" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "txt" | "md" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_client_script_before_body() {
        let result = inject_client_script("<html><body><h1>Test</h1></body></html>");

        let script_pos = result.find(CLIENT_PATH).unwrap();
        let body_pos = result.find("</body>").unwrap();
        assert!(script_pos < body_pos);
    }

    #[test]
    fn test_inject_client_script_without_body() {
        let result = inject_client_script("<h1>Fragment</h1>");
        assert!(result.starts_with("<h1>Fragment</h1>"));
        assert!(result.ends_with(r#"<script src="/__preview_client__.js"></script>"#));
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert_eq!(sanitize("/docs/a.html"), Some(PathBuf::from("docs/a.html")));
        assert_eq!(sanitize("/./a.html"), Some(PathBuf::from("a.html")));
        assert_eq!(sanitize("/"), Some(PathBuf::new()));
        assert_eq!(sanitize("/../secret"), None);
        assert_eq!(sanitize("/docs/../../secret"), None);
    }

    #[test]
    fn test_encode_url_path() {
        assert_eq!(encode_url_path("/docs/a.html"), "/docs/a.html");
        assert_eq!(encode_url_path("/my page.html"), "/my%20page.html");
        assert_eq!(encode_url_path("/café/#1.html"), "/caf%C3%A9/%231.html");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_determine_content_type() {
        assert_eq!(determine_content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(determine_content_type(Path::new("a.css")), "text/css");
        assert_eq!(determine_content_type(Path::new("a.php")), "text/html; charset=utf-8");
        assert_eq!(determine_content_type(Path::new("a.bin")), "application/octet-stream");
    }
}
