//! Metrics collection and exposition.
//!
//! # Metrics
//! - `service_component_exits_total` (counter): `run`/`stop` completions by
//!   component, phase and outcome
//! - `service_pool_gets_total` (counter): pool leases by outcome
//!   (hit, miss, error, exhausted)
//! - `service_pool_releases_total` (counter): released connections by
//!   outcome (queued, closed, evicted)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_component_exit(component: &str, phase: &'static str, ok: bool) {
    metrics::counter!(
        "service_component_exits_total",
        "component" => component.to_string(),
        "phase" => phase,
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

pub fn record_pool_get(outcome: &'static str) {
    metrics::counter!("service_pool_gets_total", "outcome" => outcome).increment(1);
}

pub fn record_pool_release(outcome: &'static str) {
    metrics::counter!("service_pool_releases_total", "outcome" => outcome).increment(1);
}
