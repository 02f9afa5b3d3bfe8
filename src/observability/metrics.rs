//! Metrics collection and exposition.
//!
//! # Metrics
//! - `shell_navigations_total` (counter): effective navigations
//! - `shell_boundary_trips_total` (counter): Stable → Errored transitions, by boundary
//! - `shell_access_denied_total` (counter): gated subtrees not rendered
//! - `shell_query_requests_total` (counter): cache lookups, by outcome
//!   (`miss`, `hit`, `coalesced`, `discarded`)
//! - `shell_api_requests_total` (counter): API responses, by path and status
//! - `shell_api_request_duration_seconds` (histogram): API latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own HTTP listener.
/// Must be called inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_navigation() {
    counter!("shell_navigations_total").increment(1);
}

pub fn record_boundary_trip(boundary: &str) {
    counter!("shell_boundary_trips_total", "boundary" => boundary.to_string()).increment(1);
}

pub fn record_access_denied() {
    counter!("shell_access_denied_total").increment(1);
}

pub fn record_query(outcome: &'static str) {
    counter!("shell_query_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_api_request(path: &'static str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("shell_api_requests_total", "path" => path, "status" => status.clone()).increment(1);
    histogram!("shell_api_request_duration_seconds", "path" => path, "status" => status)
        .record(start.elapsed().as_secs_f64());
}
