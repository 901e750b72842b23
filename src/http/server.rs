//! HTTP server setup and the per-request pipeline.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Run the per-request state machine:
//!
//! ```text
//! Start → BypassCheck ─(sentinel)→ forward verbatim
//!            │
//!            ▼
//!         Classify ─ DynamicEntity → FetchMetadata → FetchOrigin → RewriteHTML
//!                  ├ DataDocument  → Referer rule → FetchMetadata → FetchOrigin → PatchJSON
//!                  └ NoMatch       → FetchOrigin → RewriteHTML(defaults)
//! ```
//!
//! Any `ProxyError` on the classified paths is caught by a single guard that
//! serves the default-metadata page with a 200.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, request::Parts, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::error::{ProxyError, ServerError};
use crate::http::origin::OriginClient;
use crate::http::request::{is_bypassed, page_url, request_id, ProxyRequestId};
use crate::http::response::{
    build_response, html_ok, is_html, passthrough, strip_response_headers, FALLBACK_DOCUMENT,
};
use crate::metadata::{DefaultMetadata, Metadata, MetadataClient};
use crate::observability::metrics;
use crate::page_data;
use crate::rewrite::{rewrite_body, rewrite_document, RewriteContext};
use crate::routing::{entity_identifier, Classifier, PatternRule, RequestShape};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub metadata: MetadataClient,
    pub origin: OriginClient,
    pub defaults: Arc<DefaultMetadata>,
}

impl AppState {
    /// Build every request-independent component from configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ServerError> {
        let defaults = Arc::new(DefaultMetadata::from(&config.defaults));
        let classifier = Arc::new(Classifier::from_config(&config.rules)?);
        let metadata = MetadataClient::new(&config.metadata_api, defaults.clone())?;
        let origin = OriginClient::new(&config.origin)?;

        Ok(Self {
            classifier,
            metadata,
            origin,
            defaults,
        })
    }

    /// Metadata for an entity page; defaults when the path has no identifier.
    async fn entity_metadata(&self, path: &str, rule: &PatternRule) -> Metadata {
        match entity_identifier(path) {
            Some(identifier) => self.metadata.fetch(&identifier, rule).await,
            None => self.defaults.for_kind(Some(rule.kind)),
        }
    }

    /// Stream an origin response through the HTML rewriter.
    fn rewrite_response(&self, origin: reqwest::Response, ctx: RewriteContext) -> Response {
        let status = origin.status();
        let mut headers = origin.headers().clone();
        let html = is_html(&headers);
        strip_response_headers(&mut headers, html);

        let body = if html {
            rewrite_body(ctx, origin.bytes_stream())
        } else {
            Body::from_stream(origin.bytes_stream())
        };
        build_response(status, headers, body)
    }

    fn rewrite_context(&self, metadata: Metadata, parts: &Parts) -> RewriteContext {
        RewriteContext::new(
            metadata,
            self.defaults.site_name.clone(),
            page_url(parts, self.origin.public_base()),
        )
    }

    /// The default page served by the error guard.
    fn fallback_response(&self, parts: &Parts) -> Response {
        let ctx = self.rewrite_context(self.defaults.metadata(), parts);
        match rewrite_document(&ctx, FALLBACK_DOCUMENT.as_bytes()) {
            Ok(html) => html_ok(html),
            Err(e) => {
                tracing::error!(error = %e, "Failed to rewrite fallback document");
                html_ok(FALLBACK_DOCUMENT)
            }
        }
    }
}

/// HTTP server for the SEO proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;

        tracing::info!(
            rules = state.classifier.rules().len(),
            origin = %state.origin.base(),
            "Proxy pipeline initialized"
        );

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(ProxyRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The configured router, for driving the service in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();

    if is_bypassed(&parts.headers, state.origin.bypass_header()) {
        tracing::debug!(request_id = %request_id, path = %path, "Bypass sentinel present, forwarding verbatim");
        let response = match state.origin.forward(&parts, body).await {
            Ok(origin) => passthrough(origin),
            Err(e) => {
                tracing::error!(request_id = %request_id, path = %path, error = %e, "Bypass forward failed");
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        };
        metrics::record_request("bypass", response.status().as_u16(), start_time);
        return response;
    }

    let shape = state.classifier.classify(&path).shape();
    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %path,
        shape = shape.label(),
        "Proxying request"
    );

    let result = match shape {
        RequestShape::DynamicEntity(rule) => serve_entity(&state, &parts, rule).await,
        RequestShape::DataDocument => serve_data_document(&state, &parts).await,
        RequestShape::NoMatch => serve_default(&state, &parts).await,
    };

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                path = %path,
                shape = shape.label(),
                error = %e,
                "Pipeline failed, serving default page"
            );
            metrics::record_fallback(shape.label());
            state.fallback_response(&parts)
        }
    };

    metrics::record_request(shape.label(), response.status().as_u16(), start_time);
    response
}

async fn serve_entity(
    state: &AppState,
    parts: &Parts,
    rule: &PatternRule,
) -> Result<Response, ProxyError> {
    let metadata = state.entity_metadata(parts.uri.path(), rule).await;
    let origin = state.origin.fetch(parts).await?;
    Ok(state.rewrite_response(origin, state.rewrite_context(metadata, parts)))
}

async fn serve_data_document(state: &AppState, parts: &Parts) -> Result<Response, ProxyError> {
    let referer = parts
        .headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok());

    let Some((rule, page_path)) = referer.and_then(|r| state.classifier.classify_referer(r)) else {
        tracing::debug!(referer = ?referer, "Page data without a matching referer");
        return serve_default(state, parts).await;
    };

    let metadata = state.entity_metadata(&page_path, rule).await;
    let origin = state.origin.fetch(parts).await?;
    if !origin.status().is_success() {
        return Ok(passthrough(origin));
    }

    let status = origin.status();
    let bytes = origin.bytes().await?;
    let mut document: serde_json::Value = serde_json::from_slice(&bytes)?;
    page_data::patch(&mut document, &metadata);

    let response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(Body::from(serde_json::to_vec(&document)?))?;
    Ok(response)
}

async fn serve_default(state: &AppState, parts: &Parts) -> Result<Response, ProxyError> {
    let origin = state.origin.fetch(parts).await?;
    Ok(state.rewrite_response(origin, state.rewrite_context(state.defaults.metadata(), parts)))
}
