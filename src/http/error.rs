//! Errors raised inside the proxy pipeline.
//!
//! None of these reach the client: the handler's guard turns every
//! `ProxyError` into the default-metadata page.

use thiserror::Error;

use crate::routing::matcher::RuleError;

/// A failure while serving one request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("origin request failed: {0}")]
    Origin(#[from] reqwest::Error),

    #[error("invalid origin URL: {0}")]
    OriginUrl(#[from] url::ParseError),

    #[error("page data document is not valid JSON: {0}")]
    PageData(#[from] serde_json::Error),

    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("failed to build response: {0}")]
    Response(#[from] axum::http::Error),
}

/// A failure while constructing the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid bypass header name '{0}'")]
    BypassHeader(String),

    #[error("invalid origin domain_source: {0}")]
    DomainSource(#[from] url::ParseError),

    #[error("invalid origin public_url: {0}")]
    PublicUrl(url::ParseError),
}
