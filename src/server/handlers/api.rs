//! Service endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::super::AppState;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Identifiers currently held by the directory.
pub async fn api_directory(State(state): State<AppState>) -> impl IntoResponse {
    let identifiers = state.source.directory().identifiers();
    Json(serde_json::json!({
        "count": identifiers.len(),
        "identifiers": identifiers,
    }))
}
