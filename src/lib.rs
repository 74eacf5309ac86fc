//! Advisories - travel advisory mirror.
//!
//! Fetches the advisory site's country pages, extracts the JSON embedded in
//! their markup, normalizes it and republishes it over HTTP.

pub mod advisory;
pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod server;
