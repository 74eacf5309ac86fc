//! Country list, detail and map handlers.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use super::helpers::pipeline_error_response;

/// Refetch the country list, rebuild the directory and return every country.
pub async fn list_countries(State(state): State<AppState>) -> Response {
    match state.source.refresh_directory().await {
        Ok(countries) => Json(countries).into_response(),
        Err(e) => pipeline_error_response(&e),
    }
}

/// Fetch and normalize one country's page.
pub async fn country_detail(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Response {
    match state.source.country(&identifier).await {
        Ok(country) => Json(country).into_response(),
        Err(e) => pipeline_error_response(&e),
    }
}

/// Redirect to the site's map image for a country.
pub async fn country_map(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Response {
    match state.source.map_url(&identifier) {
        Ok(url) => (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response(),
        Err(e) => pipeline_error_response(&e),
    }
}
