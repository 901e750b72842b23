//! Metrics collection and exposition.
//!
//! # Metrics
//! - `seo_proxy_requests_total` (counter): requests by shape, status
//! - `seo_proxy_request_duration_seconds` (histogram): time to response head
//! - `seo_proxy_metadata_fetch_total` (counter): metadata lookups by rule, outcome
//! - `seo_proxy_metadata_fetch_duration_seconds` (histogram)
//! - `seo_proxy_fallback_total` (counter): default pages served by the error guard
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_request(shape: &'static str, status: u16, start: Instant) {
    counter!(
        "seo_proxy_requests_total",
        "shape" => shape,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("seo_proxy_request_duration_seconds", "shape" => shape)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_metadata_fetch(rule: &str, outcome: &'static str, start: Instant) {
    counter!(
        "seo_proxy_metadata_fetch_total",
        "rule" => rule.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("seo_proxy_metadata_fetch_duration_seconds", "rule" => rule.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fallback(shape: &'static str) {
    counter!("seo_proxy_fallback_total", "shape" => shape).increment(1);
}
