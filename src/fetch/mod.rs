//! Upstream page fetching.
//!
//! The pipelines only see the [`PageFetcher`] trait, so tests can swap in
//! canned pages and the server can share one pooled `reqwest` client.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Raw result of a page fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    /// Create a page with status 200.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Only a plain 200 counts as a usable page.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Transport-level fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Fetches one page. Implementations must not retry.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// `reqwest`-backed fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher. `timeout` of `None` leaves requests unbounded.
    pub fn new(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(resolve_user_agent(user_agent))
            .gzip(true)
            .brotli(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        tracing::debug!("GET {}", url);

        let network = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(network)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(network)?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(FetchedPage { status, body })
    }
}
