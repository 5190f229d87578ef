//! Metrics collection and exposition.
//!
//! # Metrics
//! - `whoami_requests_total` (counter): requests by route, status
//! - `whoami_request_duration_seconds` (histogram): latency by route,
//!   including any injected delay
//! - `whoami_injected_delay_seconds` (histogram): applied `wait` values
//! - `whoami_placement_lookup_failures_total` (counter): by field

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "whoami_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("whoami_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record a delay applied because of the `wait` parameter.
pub fn record_delay(delay: Duration) {
    metrics::histogram!("whoami_injected_delay_seconds").record(delay.as_secs_f64());
}

/// Record a failed placement lookup.
pub fn record_placement_failure(field: &'static str) {
    metrics::counter!("whoami_placement_lookup_failures_total", "field" => field).increment(1);
}
