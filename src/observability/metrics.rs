//! Metrics collection and exposition.
//!
//! # Metrics
//! - `flow_tx_submitted_total` (counter): transactions accepted by the access API
//! - `flow_tx_rejected_total` (counter): synchronous refusals, by `reason`
//! - `flow_tx_poll_attempts_total` (counter): status queries issued
//! - `flow_tx_confirmations_total` (counter): wait outcomes, by `outcome`
//! - `flow_tx_confirmation_seconds` (histogram): submit-to-terminal latency
//! - `flow_access_requests_total` (counter): access API calls, by `operation` and `status`

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submitted() {
    metrics::counter!("flow_tx_submitted_total").increment(1);
}

pub fn record_rejected(stale_sequence: bool) {
    let reason = if stale_sequence { "stale_sequence" } else { "other" };
    metrics::counter!("flow_tx_rejected_total", "reason" => reason).increment(1);
}

pub fn record_poll_attempt() {
    metrics::counter!("flow_tx_poll_attempts_total").increment(1);
}

/// `outcome` is one of `sealed`, `failed`, `expired`, `timeout`, `cancelled`, `error`.
pub fn record_confirmation(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("flow_tx_confirmations_total", "outcome" => outcome).increment(1);
    metrics::histogram!("flow_tx_confirmation_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}

pub fn record_access_request(operation: &'static str, success: bool) {
    let status = if success { "ok" } else { "error" };
    metrics::counter!(
        "flow_access_requests_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}
