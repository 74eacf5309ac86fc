//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/directory", get(handlers::api_directory))
        // Full list, also rebuilds the directory
        .route("/countries", get(handlers::list_countries))
        .route("/countries/", get(handlers::list_countries))
        // Single country, resolved through the directory
        .route("/countries/:identifier", get(handlers::country_detail))
        .route("/countries/:identifier/map", get(handlers::country_map))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
