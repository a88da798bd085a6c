//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound requests by method, status
//! - `relay_request_duration_seconds` (histogram): end-to-end latency
//! - `relay_upstream_attempts_total` (counter): delivery attempts by target, outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one inbound request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!("relay_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one upstream delivery attempt.
pub fn record_attempt(target: &str, completed: bool) {
    counter!(
        "relay_upstream_attempts_total",
        "target" => target.to_string(),
        "outcome" => if completed { "completed" } else { "failed" },
    )
    .increment(1);
}
