//! Helper functions for handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::advisory::PipelineError;

/// JSON `{ "error": message }` with `status`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// Map a pipeline failure to the client-facing response.
///
/// Upstream failures are 503, unknown countries 404, everything else a
/// generic 500 with the detail kept in the log.
pub fn pipeline_error_response(err: &PipelineError) -> Response {
    match err {
        PipelineError::Unavailable { url, reason } => {
            tracing::warn!("Upstream unavailable: {} ({})", url, reason);
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Unable to access {}", url),
            )
        }
        PipelineError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "Country not found"),
        other => {
            tracing::error!("{}", other);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
