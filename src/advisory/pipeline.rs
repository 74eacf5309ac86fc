//! Directory and detail pipelines.
//!
//! Each call makes at most one upstream request, then selects, extracts and
//! normalizes synchronously. Nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::directory::CountryDirectory;
use super::models::{CountryDetail, CountrySummary, DirectoryEntry};
use super::normalize::{normalize_detail_entry, normalize_list, NormalizeError};
use crate::extract::{
    extract, select, select_text, ExtractionError, JsonKind, ScanMode, SelectError, DETAIL_QUERY,
    LIST_QUERY, TITLE_SELECTOR,
};
use crate::fetch::{FetchedPage, PageFetcher};

/// Path of the country list page under the site's base URL.
pub const LIST_PATH: &str = "/countries/pages/list.aspx";

/// Identifier whose map image does not follow the `/Maps/{identifier}.gif` pattern.
const BAHAMAS: &str = "bahamas";
const BAHAMAS_MAP_PATH: &str = "/Maps/The_Bahamas.gif";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unable to access {url}: {reason}")]
    Unavailable { url: Url, reason: String },

    #[error("country not found: {0}")]
    NotFound(String),

    #[error("{page}: {source}")]
    Selection { page: String, source: SelectError },

    #[error("{page}: {source}")]
    Extraction {
        page: String,
        source: ExtractionError,
    },

    #[error("{page}: {source}")]
    Normalize {
        page: String,
        source: NormalizeError,
    },

    #[error("{0} contained no usable countries")]
    NoValidEntries(Url),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// The advisory site and the directory built from it.
#[derive(Clone)]
pub struct AdvisorySource {
    fetcher: Arc<dyn PageFetcher>,
    directory: Arc<CountryDirectory>,
    base_url: Url,
    scan: ScanMode,
}

impl AdvisorySource {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        directory: Arc<CountryDirectory>,
        base_url: Url,
        scan: ScanMode,
    ) -> Self {
        Self {
            fetcher,
            directory,
            base_url,
            scan,
        }
    }

    pub fn directory(&self) -> &CountryDirectory {
        &self.directory
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn list_url(&self) -> Result<Url, PipelineError> {
        Ok(self.base_url.join(LIST_PATH)?)
    }

    /// Fetch `url`, treating anything but a 200 as unavailable.
    async fn fetch_page(&self, url: &Url) -> Result<String, PipelineError> {
        let page: FetchedPage =
            self.fetcher
                .fetch(url)
                .await
                .map_err(|e| PipelineError::Unavailable {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

        if !page.is_ok() {
            return Err(PipelineError::Unavailable {
                url: url.clone(),
                reason: format!("status {}", page.status),
            });
        }

        Ok(page.body)
    }

    /// Fetch the list page, normalize every country and rebuild the directory.
    ///
    /// The directory is only replaced when at least one country survives
    /// normalization; on any error the previous directory stays in place.
    pub async fn refresh_directory(&self) -> Result<Vec<CountrySummary>, PipelineError> {
        let list_url = self.list_url()?;
        let body = self.fetch_page(&list_url).await?;
        let page = list_url.to_string();

        let markup = select(&body, &LIST_QUERY).map_err(|source| PipelineError::Selection {
            page: page.clone(),
            source,
        })?;

        let raw = extract(&markup, JsonKind::Array, self.scan).map_err(|source| {
            PipelineError::Extraction {
                page: page.clone(),
                source,
            }
        })?;
        let entries = match raw {
            Value::Array(entries) => entries,
            _ => Vec::new(),
        };

        let countries = normalize_list(entries, &self.base_url, Utc::now());
        if countries.is_empty() {
            return Err(PipelineError::NoValidEntries(list_url));
        }

        self.directory
            .replace_all(countries.iter().map(CountrySummary::directory_entry));
        info!("Directory rebuilt with {} countries", self.directory.len());

        Ok(countries)
    }

    /// Resolve `identifier` in the directory and normalize its detail page.
    pub async fn country(&self, identifier: &str) -> Result<CountryDetail, PipelineError> {
        let entry: DirectoryEntry = self
            .directory
            .lookup(identifier)
            .ok_or_else(|| PipelineError::NotFound(identifier.to_string()))?;

        debug!("Resolved {} to {}", identifier, entry.url);
        let body = self.fetch_page(&entry.url).await?;
        let page = format!("info page for {}", entry.identifier);

        let markup = select(&body, &DETAIL_QUERY).map_err(|source| PipelineError::Selection {
            page: page.clone(),
            source,
        })?;

        let raw = extract(&markup, JsonKind::Object, self.scan).map_err(|source| {
            PipelineError::Extraction {
                page: page.clone(),
                source,
            }
        })?;

        let title = select_text(&body, TITLE_SELECTOR).map_err(|source| {
            PipelineError::Selection {
                page: page.clone(),
                source,
            }
        })?;

        normalize_detail_entry(raw, &entry, title, Utc::now()).map_err(|source| {
            warn!("Could not normalize {}: {}", page, source);
            PipelineError::Normalize { page, source }
        })
    }

    /// Map image for `identifier`.
    pub fn map_url(&self, identifier: &str) -> Result<Url, PipelineError> {
        let path = if identifier == BAHAMAS {
            BAHAMAS_MAP_PATH.to_string()
        } else {
            format!("/Maps/{}.gif", identifier)
        };
        Ok(self.base_url.join(&path)?)
    }
}
