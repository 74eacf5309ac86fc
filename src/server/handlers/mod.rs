//! HTTP request handlers for the web server.

mod api;
mod countries;
mod helpers;

// Re-export handlers for use by the router
pub use api::{api_directory, health};
pub use countries::{country_detail, country_map, list_countries};
