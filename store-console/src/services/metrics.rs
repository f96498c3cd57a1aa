//! Metrics collection and Prometheus export.
//!
//! Installs the Prometheus recorder behind the `metrics` facade and exposes
//! the console's own counters.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Count one File Search API call.
pub fn record_api_call(operation: &'static str, outcome: &'static str) {
    counter!(
        "file_search_api_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Count one operation poll.
pub fn record_operation_poll(outcome: &'static str) {
    counter!("operation_polls_total", "outcome" => outcome).increment(1);
}
