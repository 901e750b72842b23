//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Detect the bypass sentinel
//! - Prepare inbound headers for the origin fetch
//! - Derive the public page URL for structured data

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::request::Parts;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Correlation header name.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Value the bypass sentinel header carries.
pub const BYPASS_VALUE: &str = "true";

/// Hop-by-hop headers plus headers the client recomputes for the origin.
const NEVER_FORWARD: [HeaderName; 11] = [
    header::CONNECTION,
    header::HOST,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
    header::PROXY_AUTHENTICATE,
    header::ACCEPT_ENCODING,
    HeaderName::from_static("keep-alive"),
];

/// Conditional/caching headers that would let the origin answer 304 and skip rewriting.
const CONDITIONAL: [HeaderName; 7] = [
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
    header::IF_MATCH,
    header::IF_UNMODIFIED_SINCE,
    header::IF_RANGE,
    header::CACHE_CONTROL,
    header::PRAGMA,
];

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyRequestId;

impl MakeRequestId for ProxyRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of an inbound request, or `unknown`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// True if the request carries the bypass sentinel.
pub fn is_bypassed(headers: &HeaderMap, bypass_header: &HeaderName) -> bool {
    headers
        .get(bypass_header)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(BYPASS_VALUE))
}

/// Headers for a verbatim forward: hop-by-hop headers removed.
pub fn passthrough_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in &NEVER_FORWARD {
        if *name != header::ACCEPT_ENCODING {
            headers.remove(name);
        }
    }
    headers
}

/// Headers for an origin fetch whose body will be rewritten.
pub fn forward_headers(inbound: &HeaderMap, bypass_header: &HeaderName) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in NEVER_FORWARD.iter().chain(CONDITIONAL.iter()) {
        headers.remove(name);
    }
    headers.insert(bypass_header.clone(), HeaderValue::from_static(BYPASS_VALUE));
    headers
}

/// Path and query of the inbound request, as sent to the origin.
pub fn path_and_query(parts: &Parts) -> &str {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
}

/// Public URL of the page being served, used in structured data.
///
/// Always built from the configured public base; `Host` and
/// `X-Forwarded-Proto` are client-controlled and ignored.
pub fn page_url(parts: &Parts, public_base: &str) -> String {
    format!("{}{}", public_base.trim_end_matches('/'), parts.uri.path())
}
