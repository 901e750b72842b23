//! Response handling and transformation.
//!
//! # Responsibilities
//! - Strip `X-Robots-Tag` so the rewritten robots meta tag is the only indexing signal
//! - Drop framing headers the server recomputes
//! - Convert origin responses into axum responses (streaming)
//! - Provide the minimal document served by the error guard

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::Response;

/// Response header removed from every proxied response.
pub const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// Skeleton served when the pipeline fails. The rewriter fills in every tag.
pub const FALLBACK_DOCUMENT: &str = concat!(
    "<!DOCTYPE html><html lang=\"pt-BR\"><head>",
    "<meta charset=\"utf-8\">",
    "<title></title>",
    "<meta name=\"title\" content=\"\">",
    "<meta name=\"description\" content=\"\">",
    "<meta name=\"keywords\" content=\"\">",
    "<meta name=\"robots\" content=\"\">",
    "<meta property=\"og:title\" content=\"\">",
    "<meta property=\"og:description\" content=\"\">",
    "<meta property=\"og:image\" content=\"\">",
    "<meta property=\"og:site_name\" content=\"\">",
    "<meta property=\"og:type\" content=\"\">",
    "<meta name=\"twitter:card\" content=\"\">",
    "<meta name=\"twitter:title\" content=\"\">",
    "<meta name=\"twitter:description\" content=\"\">",
    "<meta name=\"twitter:image\" content=\"\">",
    "</head><body>Default content</body></html>",
);

/// Remove headers that must not reach the client.
///
/// `rewritten` additionally drops `Content-Length`, since the body size changes.
pub fn strip_response_headers(headers: &mut HeaderMap, rewritten: bool) {
    headers.remove(X_ROBOTS_TAG);
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONNECTION);
    if rewritten {
        headers.remove(header::CONTENT_LENGTH);
    }
}

/// True if the response declares an HTML body.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"))
}

/// Build a response from parts.
pub fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Stream an origin response to the client unchanged apart from header stripping.
pub fn passthrough(origin: reqwest::Response) -> Response {
    let status = origin.status();
    let mut headers = origin.headers().clone();
    strip_response_headers(&mut headers, false);
    build_response(status, headers, Body::from_stream(origin.bytes_stream()))
}

/// A 200 HTML response.
pub fn html_ok(body: impl Into<Body>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    build_response(StatusCode::OK, headers, body.into())
}
