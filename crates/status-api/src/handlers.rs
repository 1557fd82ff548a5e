use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use proxyctl_common::metrics;

use crate::state::AppState;
use crate::views::{ConfigView, HealthView, StatsView};

pub async fn version() -> String {
    format!("proxyctl {}", env!("CARGO_PKG_VERSION"))
}

pub async fn config(State(state): State<AppState>) -> Json<ConfigView> {
    let config = state.config.read().await;
    Json(ConfigView::from_configuration(&config))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthView>) {
    let config = state.config.read().await;
    let endpoints = config.endpoints.snapshot_all().await;
    let snapshot = config.health_snapshot(endpoints).await;

    let any_endpoint_healthy = snapshot.endpoints.iter().any(|e| e.healthy);
    let healthy = snapshot.config.healthy && snapshot.template.healthy && any_endpoint_healthy;

    let status = if healthy { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
    let body = HealthView {
        healthy,
        config: snapshot.config,
        template: snapshot.template,
        endpoints: snapshot.endpoints,
    };

    (status, Json(body))
}

/// Non-blocking offer into the Reload Queue. Always returns 202 — the body
/// says whether the token was accepted or the queue was already full.
pub async fn reload(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.reload_tx.try_send(()) {
        Ok(()) => (StatusCode::ACCEPTED, "queued"),
        Err(_) => (StatusCode::ACCEPTED, "queue is full"),
    }
}

pub async fn stats() -> Json<StatsView> {
    Json(StatsView {
        events_received: metrics::EVENTS_RECEIVED.get(),
        reloads_succeeded: metrics::RELOADS_SUCCEEDED.get(),
        reloads_failed: metrics::RELOADS_FAILED.get(),
        stream_errors: metrics::STREAM_ERRORS.get(),
        stream_no_data_warnings: metrics::STREAM_NO_DATA_WARNINGS.get(),
        duplicate_subdomain_warnings: metrics::DUPLICATE_SUBDOMAIN_WARNINGS.get(),
        endpoint_down_events: metrics::ENDPOINT_DOWN_EVENTS.get(),
        all_endpoints_down_events: metrics::ALL_ENDPOINTS_DOWN_EVENTS.get(),
    })
}

pub async fn metrics_text() -> (StatusCode, String) {
    (StatusCode::OK, metrics::encode())
}
