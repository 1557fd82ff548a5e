use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::metrics_middleware::track_metrics;
use crate::state::AppState;

/// The embedded status server's routes (spec.md §4.I), plus the two ambient
/// additions (`/v1/stats`, `/metrics`) that don't shrink the named five.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::version))
        .route("/v1/config", get(handlers::config))
        .route("/v1/health", get(handlers::health))
        .route("/v1/reload", get(handlers::reload).post(handlers::reload))
        .route("/v1/stats", get(handlers::stats))
        .route("/metrics", get(handlers::metrics_text))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(track_metrics))
                .layer(TraceLayer::new_for_http()),
        )
}
