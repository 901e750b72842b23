//! Metadata API client.
//!
//! # Responsibilities
//! - Build the endpoint URL for an entity identifier
//! - Issue a single authenticated GET (no retries)
//! - Accept the legacy `{source: {"0": {...}}}` and the plain array shapes
//! - Resolve bare image identifiers into storage URLs
//! - Degrade to the defaults on any failure; never return an error

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::schema::MetadataApiConfig;
use crate::metadata::types::{DefaultMetadata, Metadata, MetadataRecord};
use crate::observability::metrics;
use crate::routing::matcher::PatternRule;

/// Reasons a metadata lookup fell back to the defaults.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("metadata API returned status {0}")]
    Status(StatusCode),

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("empty or unrecognized result")]
    Empty,
}

impl FetchError {
    fn outcome(&self) -> &'static str {
        match self {
            FetchError::Endpoint(_) => "endpoint_error",
            FetchError::Transport(_) => "transport_error",
            FetchError::Status(_) => "status_error",
            FetchError::Decode(_) => "decode_error",
            FetchError::Empty => "empty",
        }
    }
}

/// Client for the metadata REST API.
#[derive(Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    api_key: String,
    storage_base: String,
    select: String,
    defaults: Arc<DefaultMetadata>,
}

impl MetadataClient {
    /// Create a new client from configuration.
    pub fn new(
        config: &MetadataApiConfig,
        defaults: Arc<DefaultMetadata>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let api_key = config.resolve_api_key();
        if api_key.is_empty() {
            tracing::warn!(
                env = %config.api_key_env,
                "No metadata API key configured; requests will be unauthenticated"
            );
        }

        Ok(Self {
            http: builder.build()?,
            api_key,
            storage_base: config.storage_base.trim_end_matches('/').to_string(),
            select: config.select.clone(),
            defaults,
        })
    }

    /// Fetch metadata for `identifier` from the rule's endpoint.
    ///
    /// Always returns usable metadata: any failure yields the defaults tagged
    /// with the rule's kind.
    pub async fn fetch(&self, identifier: &str, rule: &PatternRule) -> Metadata {
        let start = Instant::now();
        match self.try_fetch(identifier, rule).await {
            Ok(metadata) => {
                tracing::debug!(rule = %rule.name, identifier, "Metadata resolved");
                metrics::record_metadata_fetch(&rule.name, "ok", start);
                metadata
            }
            Err(e) => {
                match &e {
                    FetchError::Transport(_) | FetchError::Endpoint(_) => {
                        tracing::error!(rule = %rule.name, identifier, error = %e, "Metadata fetch failed")
                    }
                    _ => {
                        tracing::warn!(rule = %rule.name, identifier, error = %e, "Metadata unavailable, using defaults")
                    }
                }
                metrics::record_metadata_fetch(&rule.name, e.outcome(), start);
                self.defaults.for_kind(Some(rule.kind))
            }
        }
    }

    /// Columns requested for `rule`: its own list, else the global one.
    pub fn columns<'a>(&'a self, rule: &'a PatternRule) -> &'a str {
        rule.select.as_deref().unwrap_or(&self.select)
    }

    async fn try_fetch(&self, identifier: &str, rule: &PatternRule) -> Result<Metadata, FetchError> {
        let url = rule.endpoint.resolve(identifier, self.columns(rule))?;

        let response = self
            .http
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let payload: Value = serde_json::from_slice(&response.bytes().await?)?;
        let mut record = extract_record(payload)?;

        if let Some(image) = record.image.take() {
            record.image = Some(resolve_image(&image, &self.storage_base, &rule.image_folder));
        }

        Ok(self.defaults.merge(record, Some(rule.kind)))
    }
}

/// Pull the first record out of either response shape.
pub fn extract_record(payload: Value) -> Result<MetadataRecord, FetchError> {
    let item = match payload {
        Value::Array(items) => items.into_iter().next(),
        Value::Object(mut map) => match map.remove("source") {
            Some(Value::Object(mut source)) => source.remove("0"),
            Some(Value::Array(items)) => items.into_iter().next(),
            _ => None,
        },
        _ => None,
    };

    let item = item.filter(Value::is_object).ok_or(FetchError::Empty)?;
    let record: MetadataRecord = serde_json::from_value(item)?;
    if record.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(record)
}

/// Qualify a bare image identifier into a storage URL. Absolute URLs pass through.
pub fn resolve_image(image: &str, storage_base: &str, folder: &str) -> String {
    let image = image.trim();
    if image.is_empty() || image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }
    format!(
        "{}/{}/{}",
        storage_base.trim_end_matches('/'),
        folder.trim_matches('/'),
        image.trim_start_matches('/')
    )
}
