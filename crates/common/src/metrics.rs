//! Process-wide Prometheus registry.
//!
//! Every counter/histogram named in spec.md §6's metrics list lives here so
//! the controller's tasks and the status server's `GET /metrics` handler
//! share one registration.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, register_int_counter,
    CounterVec, Histogram, HistogramVec, IntCounter, TextEncoder,
};

lazy_static! {
    pub static ref RELOADS_SUCCEEDED: IntCounter = register_int_counter!(
        "proxyctl_reloads_succeeded_total",
        "Total number of reload pipeline runs that reached a successful proxy reload"
    )
    .expect("failed to register RELOADS_SUCCEEDED");

    pub static ref RELOADS_FAILED: IntCounter = register_int_counter!(
        "proxyctl_reloads_failed_total",
        "Total number of reload pipeline runs that failed at any stage"
    )
    .expect("failed to register RELOADS_FAILED");

    pub static ref RELOAD_DURATION: Histogram = register_histogram!(
        "proxyctl_reload_duration_seconds",
        "Duration of the render-validate-swap-reload sequence",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("failed to register RELOAD_DURATION");

    pub static ref ENDPOINT_DOWN_EVENTS: IntCounter = register_int_counter!(
        "proxyctl_endpoint_down_events_total",
        "Total number of times an endpoint's health bit flipped to unhealthy"
    )
    .expect("failed to register ENDPOINT_DOWN_EVENTS");

    pub static ref ALL_ENDPOINTS_DOWN_EVENTS: IntCounter = register_int_counter!(
        "proxyctl_all_endpoints_down_events_total",
        "Total number of times every endpoint was unhealthy at once"
    )
    .expect("failed to register ALL_ENDPOINTS_DOWN_EVENTS");

    pub static ref STREAM_ERRORS: IntCounter = register_int_counter!(
        "proxyctl_stream_errors_total",
        "Total number of event stream transport/decode errors"
    )
    .expect("failed to register STREAM_ERRORS");

    pub static ref STREAM_NO_DATA_WARNINGS: IntCounter = register_int_counter!(
        "proxyctl_stream_no_data_warnings_total",
        "Total number of watchdog timeouts on the event stream"
    )
    .expect("failed to register STREAM_NO_DATA_WARNINGS");

    pub static ref EVENTS_RECEIVED: IntCounter = register_int_counter!(
        "proxyctl_events_received_total",
        "Total number of server-sent events consumed from the orchestrator"
    )
    .expect("failed to register EVENTS_RECEIVED");

    pub static ref DUPLICATE_SUBDOMAIN_WARNINGS: IntCounter = register_int_counter!(
        "proxyctl_duplicate_subdomain_warnings_total",
        "Total number of apps dropped by the reconciler due to a duplicate derived host"
    )
    .expect("failed to register DUPLICATE_SUBDOMAIN_WARNINGS");

    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "proxyctl_http_requests_total",
        "Total HTTP requests handled by the embedded status server",
        &["method", "path", "status"]
    )
    .expect("failed to register HTTP_REQUESTS_TOTAL");

    pub static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "proxyctl_http_request_duration_seconds",
        "Status server request duration",
        &["method", "path"]
    )
    .expect("failed to register HTTP_REQUEST_DURATION");
}

/// Render the registry in Prometheus text exposition format.
pub fn encode() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    match encoder.encode_to_string(&metric_families) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_includes_registered_metric_names() {
        RELOADS_SUCCEEDED.inc();
        let text = encode();
        assert!(text.contains("proxyctl_reloads_succeeded_total"));
    }
}
