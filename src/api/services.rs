use axum::{Json, extract::State, http::Uri, response::IntoResponse};

use super::error::ApiError;
use super::models::HealthResponse;
use super::state::AppState;

/// Health check endpoint (GET /health)
///
/// Reports the crate version and the in-process counters.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        metrics: state.metrics.snapshot(),
    };

    Json(response)
}

/// Fallback for every unmatched route or method
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("route not found: {}", uri.path()))
}
