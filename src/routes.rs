use crate::handlers::{FixtureState, health_check, query_handler};
use axum::{Router, routing::get, routing::post};
use std::sync::Arc;

/// Creates the mock server's routes, mirroring the real RAG API
pub fn create_routes() -> Router<Arc<FixtureState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/query", post(query_handler))
}
