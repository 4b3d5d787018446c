//! HTTP API route definitions.

use axum::{routing::get, Router};

use super::handlers::{health, home, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .with_state(state)
}
