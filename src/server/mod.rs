//! Web server republishing the advisory site's countries as JSON.
//!
//! - `/countries/` refetches the list and rebuilds the directory
//! - `/countries/:identifier` resolves through the directory and fetches one page
//! - `/countries/:identifier/map` redirects to the site's map image

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::advisory::{AdvisorySource, CountryDirectory};
use crate::config::Settings;
use crate::fetch::HttpFetcher;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub source: AdvisorySource,
}

impl AppState {
    pub fn new(source: AdvisorySource) -> Self {
        Self { source }
    }

    /// Build state backed by a real HTTP fetcher and an empty directory.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(settings.request_timeout, settings.user_agent.as_deref())?;
        let source = AdvisorySource::new(
            Arc::new(fetcher),
            Arc::new(CountryDirectory::new()),
            settings.base_url.clone(),
            settings.json_scan,
        );
        Ok(Self::new(source))
    }

    /// Populate the directory once. Failure leaves it empty.
    pub async fn prime_directory(&self) {
        match self.source.refresh_directory().await {
            Ok(countries) => tracing::info!("Directory primed with {} countries", countries.len()),
            Err(e) => tracing::warn!("Could not prime country directory: {}", e),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;

    let primer = state.clone();
    tokio::spawn(async move { primer.prime_directory().await });

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
