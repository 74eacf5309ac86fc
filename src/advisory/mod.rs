//! Country advisories: normalization, the in-memory directory, and the
//! pipelines that tie fetching, extraction and normalization together.

mod directory;
mod models;
mod normalize;
mod pipeline;

pub use directory::CountryDirectory;
pub use models::{CountryDetail, CountrySummary, DirectoryEntry};
pub use normalize::{
    advice_levels, article_date, identifier_from_reference, normalize_detail_entry,
    normalize_list, normalize_list_entry, url_from_reference, AdviceLevels, ArticleDate,
    NormalizeError,
};
pub use pipeline::{AdvisorySource, PipelineError, LIST_PATH};
