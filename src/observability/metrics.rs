//! Metrics collection and exposition.
//!
//! # Metrics
//! - `console_upstream_requests_total` (counter): backend calls by method, route, status
//! - `console_upstream_duration_seconds` (histogram): backend call latency
//! - `console_fallbacks_total` (counter): synthetic replies by policy
//! - `console_guard_redirects_total` (counter): page guard redirects by target
//! - `console_sessions_total` (counter): sessions issued and revoked

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one backend call. `status` is 0 when no reply arrived.
pub fn record_upstream(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("console_upstream_requests_total", &labels[..]).increment(1);
    metrics::histogram!("console_upstream_duration_seconds", &labels[..2])
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fallback(policy: &'static str, route: &str) {
    metrics::counter!("console_fallbacks_total", "policy" => policy, "route" => route.to_string())
        .increment(1);
}

pub fn record_guard_redirect(target: &'static str) {
    metrics::counter!("console_guard_redirects_total", "target" => target).increment(1);
}

pub fn record_session(event: &'static str) {
    metrics::counter!("console_sessions_total", "event" => event).increment(1);
}
