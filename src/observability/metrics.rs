//! Metrics collection and exposition.
//!
//! # Metrics
//! - `indexer_requests_total` (counter): logical requests by outcome
//! - `indexer_request_duration_seconds` (histogram): end-to-end latency
//! - `indexer_cache_hits_total` / `indexer_cache_misses_total` (counters)
//! - `indexer_cache_entries` (gauge): current cache size
//! - `indexer_inflight_attached_total` (counter): callers coalesced onto a running request
//! - `indexer_attempts_total` (counter): transport attempts by endpoint and outcome
//! - `indexer_failovers_total` (counter): endpoint rotations
//! - `indexer_limiter_wait_seconds` (histogram): time spent waiting for a token
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::time::Instant;
use url::Url;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str, started: Instant) {
    counter!("indexer_requests_total", "outcome" => outcome).increment(1);
    histogram!("indexer_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_cache_hit() {
    counter!("indexer_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    counter!("indexer_cache_misses_total").increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("indexer_cache_entries").set(entries as f64);
}

pub fn record_inflight_attach() {
    counter!("indexer_inflight_attached_total").increment(1);
}

pub fn record_attempt(endpoint: &Url, outcome: &'static str) {
    let host = endpoint.host_str().unwrap_or("unknown").to_string();
    counter!("indexer_attempts_total", "endpoint" => host, "outcome" => outcome).increment(1);
}

pub fn record_failover() {
    counter!("indexer_failovers_total").increment(1);
}

pub fn record_limiter_wait(waited: Duration) {
    histogram!("indexer_limiter_wait_seconds").record(waited.as_secs_f64());
}
