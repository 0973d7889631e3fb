//! API route table.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, AppState};

/// Build the API router (everything under `/api`).
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Recommendation
        .route("/recommendation/analyze", post(handlers::analyze))
        .route("/recommendation/latest", get(handlers::recommendation_latest))
        // Watch snapshots
        .route("/watch/ingest", post(handlers::watch_ingest))
        .route("/watch/latest", get(handlers::watch_latest))
        // ML
        .route("/ml/learn", post(handlers::learn))
        .route("/ml/retrain", post(handlers::retrain))
        .route("/ml/rules", get(handlers::rules))
        .with_state(state)
}

/// Plain health endpoint at the root, outside `/api`.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .with_state(state)
}
