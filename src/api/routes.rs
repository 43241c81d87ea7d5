//! HTTP API route definitions.

use axum::{middleware, routing::get, Router};

use super::handlers::{healthz, index, metrics, not_found, AppState};
use super::middleware::track_requests;

/// Create the API router. Every route, including the fallback, is instrumented.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .with_state(state)
}
