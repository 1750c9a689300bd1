//! Metrics collection and exposition.
//!
//! # Metrics
//! - `crm_requests_total` (counter): upstream attempts by method, path, outcome
//! - `crm_request_duration_seconds` (histogram): upstream attempt latency
//! - `crm_retries_total` (counter): retries by call and failure kind
//! - `crm_rate_limit_wait_seconds` (histogram): time spent waiting for a slot
//! - `gateway_requests_total` (counter): inbound requests by method, status
//! - `gateway_request_duration_seconds` (histogram): inbound latency
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_upstream_call(method: &str, path: &str, outcome: &str, elapsed: Duration) {
    counter!(
        "crm_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!("crm_request_duration_seconds", "path" => path.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_retry(call: &str, reason: &str) {
    counter!(
        "crm_retries_total",
        "call" => call.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

pub fn record_rate_limit_wait(waited: Duration) {
    histogram!("crm_rate_limit_wait_seconds").record(waited.as_secs_f64());
}

pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}
