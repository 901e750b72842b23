//! Origin client.
//!
//! # Responsibilities
//! - Issue rewrite-path fetches (`GET {domain_source}{path}`) with filtered headers
//! - Forward bypassed requests verbatim (method, headers, body)
//!
//! # Design Decisions
//! - No retries; a failed fetch surfaces as `ProxyError` to the handler's guard
//! - `Accept-Encoding` is never forwarded on rewrite paths so bodies arrive as plain HTML/JSON

use std::time::Duration;

use axum::body::Body;
use axum::http::header::HeaderName;
use axum::http::request::Parts;
use url::Url;

use crate::config::schema::OriginConfig;
use crate::http::error::{ProxyError, ServerError};
use crate::http::request::{forward_headers, passthrough_headers, path_and_query};

/// Largest inbound body buffered for a bypass forward.
const MAX_FORWARD_BODY: usize = 10 * 1024 * 1024;

/// HTTP client bound to the origin site.
#[derive(Clone)]
pub struct OriginClient {
    http: reqwest::Client,
    base: String,
    public_base: String,
    bypass_header: HeaderName,
}

impl OriginClient {
    pub fn new(config: &OriginConfig) -> Result<Self, ServerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let bypass_header = HeaderName::from_bytes(config.bypass_header.as_bytes())
            .map_err(|_| ServerError::BypassHeader(config.bypass_header.clone()))?;

        let base = config.domain_source.trim_end_matches('/').to_string();
        Url::parse(&base)?;

        let public_base = match config.public_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => {
                let url = url.trim_end_matches('/');
                Url::parse(url).map_err(ServerError::PublicUrl)?;
                url.to_string()
            }
            None => base.clone(),
        };

        Ok(Self {
            http: builder.build()?,
            base,
            public_base,
            bypass_header,
        })
    }

    pub fn bypass_header(&self) -> &HeaderName {
        &self.bypass_header
    }

    /// Base URL of the origin site.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Public base URL of the site, for page URLs in structured data.
    pub fn public_base(&self) -> &str {
        &self.public_base
    }

    /// Absolute origin URL for an inbound path and query.
    pub fn url_for(&self, path_and_query: &str) -> Result<Url, ProxyError> {
        Ok(Url::parse(&format!("{}{}", self.base, path_and_query))?)
    }

    /// Fetch the origin resource for a request that will be rewritten.
    pub async fn fetch(&self, parts: &Parts) -> Result<reqwest::Response, ProxyError> {
        let url = self.url_for(path_and_query(parts))?;
        let response = self
            .http
            .get(url)
            .headers(forward_headers(&parts.headers, &self.bypass_header))
            .send()
            .await?;
        Ok(response)
    }

    /// Forward a bypassed request verbatim.
    pub async fn forward(&self, parts: &Parts, body: Body) -> Result<reqwest::Response, ProxyError> {
        let url = self.url_for(path_and_query(parts))?;
        let body = axum::body::to_bytes(body, MAX_FORWARD_BODY).await?;
        let response = self
            .http
            .request(parts.method.clone(), url)
            .headers(passthrough_headers(&parts.headers))
            .body(body)
            .send()
            .await?;
        Ok(response)
    }
}
