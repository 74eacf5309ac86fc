//! Normalization of raw records embedded in the advisory site's pages.
//!
//! The site serializes dates as `/Date(<millis>)/`, nests the advice levels as
//! a JSON document inside a string field, and publishes summaries as HTML.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::models::{CountryDetail, CountrySummary, DirectoryEntry};
use crate::extract::strip_markup;

/// Path-like reference holding the identifier and the detail page path.
pub const FILE_REF: &str = "FileRef";
pub const CONTENT_TYPE: &str = "ContentType";
pub const ARTICLE_START_DATE: &str = "ArticleStartDate";
pub const ADVICE_LEVELS: &str = "Smartraveller_x0020_Advice_x0020_Levels";
pub const SUMMARY_HTML: &str = "Smartraveller_x0020_Summary";

/// Separates the list-internal path from the detail page path in `FileRef`.
const URL_MARKER: &str = ";#";

/// Length of the `/Date(` prefix.
const MS_DATE_PREFIX_LEN: usize = 6;

/// Keys a normalized summary sets itself.
const SUMMARY_KEYS: &[&str] = &[
    "NormalizedTitle",
    "URL",
    "LastModified",
    "AdviceIssued",
    "Advice",
];

/// Keys a normalized detail record adds on top of [`SUMMARY_KEYS`].
const DETAIL_KEYS: &[&str] = &["Title", "Summary"];

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no FileRef")]
    MissingReference,

    #[error("{0} did not contain an identifier")]
    NoIdentifier(String),

    #[error("{0} did not contain a URL")]
    NoUrlMarker(String),

    #[error("{reference} has an invalid URL: {source}")]
    InvalidUrl {
        reference: String,
        source: url::ParseError,
    },

    #[error("record has no advice levels")]
    MissingAdviceLevels,

    #[error("advice levels are not a JSON string")]
    AdviceLevelsNotString,

    #[error("advice levels could not be parsed: {0}")]
    AdviceLevels(#[from] serde_json::Error),
}

/// A record's last-modified time and whether it came from the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleDate {
    Parsed(DateTime<Utc>),
    /// The record's date was absent or unusable; holds the current time.
    Fallback(DateTime<Utc>),
}

impl ArticleDate {
    pub fn timestamp(self) -> DateTime<Utc> {
        match self {
            ArticleDate::Parsed(ts) | ArticleDate::Fallback(ts) => ts,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, ArticleDate::Fallback(_))
    }
}

/// Parsed advice levels.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceLevels {
    pub issued: bool,
    pub items: Vec<Value>,
}

/// Identifier between the last `/` and the last `.` of `reference`.
pub fn identifier_from_reference(reference: &str) -> Result<String, NormalizeError> {
    match (reference.rfind('/'), reference.rfind('.')) {
        (Some(slash), Some(dot)) if dot > slash + 1 => Ok(reference[slash + 1..dot].to_string()),
        _ => Err(NormalizeError::NoIdentifier(reference.to_string())),
    }
}

/// Detail page URL: everything after the first `;#`, resolved against `base_url`.
pub fn url_from_reference(reference: &str, base_url: &Url) -> Result<Url, NormalizeError> {
    let marker = reference
        .find(URL_MARKER)
        .ok_or_else(|| NormalizeError::NoUrlMarker(reference.to_string()))?;

    base_url
        .join(&reference[marker + URL_MARKER.len()..])
        .map_err(|source| NormalizeError::InvalidUrl {
            reference: reference.to_string(),
            source,
        })
}

/// Read a `/Date(<millis>)/` value, falling back to `now`.
pub fn article_date(raw: Option<&Value>, now: DateTime<Utc>) -> ArticleDate {
    raw.and_then(Value::as_str)
        .and_then(|s| s.get(MS_DATE_PREFIX_LEN..))
        .and_then(leading_integer)
        .and_then(DateTime::from_timestamp_millis)
        .map(ArticleDate::Parsed)
        .unwrap_or(ArticleDate::Fallback(now))
}

/// Optional sign and digits at the start of `s`, after leading whitespace.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['-', '+']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

/// Parse the advice-levels field, itself a JSON document in a string.
///
/// Advice counts as issued only when the document's `isTA` is truthy.
pub fn advice_levels(raw: Option<&Value>) -> Result<AdviceLevels, NormalizeError> {
    let levels: Value = match raw {
        None => return Err(NormalizeError::MissingAdviceLevels),
        Some(Value::String(encoded)) => serde_json::from_str(encoded)?,
        Some(Value::Object(_)) | Some(Value::Array(_)) => {
            return Err(NormalizeError::AdviceLevelsNotString)
        }
        Some(scalar) => scalar.clone(),
    };

    let issued = levels.get("isTA").is_some_and(is_truthy);
    let items = if issued {
        levels
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    Ok(AdviceLevels { issued, items })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn into_fields(raw: Value) -> Result<Map<String, Value>, NormalizeError> {
    match raw {
        Value::Object(fields) => Ok(fields),
        _ => Err(NormalizeError::NotAnObject),
    }
}

fn drop_keys(fields: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        fields.remove(*key);
    }
}

/// Normalize one entry of the embedded country list.
pub fn normalize_list_entry(
    raw: Value,
    base_url: &Url,
    now: DateTime<Utc>,
) -> Result<CountrySummary, NormalizeError> {
    let mut fields = into_fields(raw)?;

    let reference = match fields.get(FILE_REF) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(NormalizeError::MissingReference),
    };

    let identifier = identifier_from_reference(&reference)?;
    let url = url_from_reference(&reference, base_url)?;
    let last_modified = article_date(fields.get(ARTICLE_START_DATE), now).timestamp();
    let advice = advice_levels(fields.get(ADVICE_LEVELS))?;

    drop_keys(
        &mut fields,
        &[FILE_REF, CONTENT_TYPE, ARTICLE_START_DATE, ADVICE_LEVELS],
    );
    drop_keys(&mut fields, SUMMARY_KEYS);

    Ok(CountrySummary {
        identifier,
        url,
        last_modified,
        advice_issued: advice.issued,
        advice: advice.items,
        extra: fields,
    })
}

/// Normalize a detail page record for an already-resolved directory entry.
pub fn normalize_detail_entry(
    raw: Value,
    entry: &DirectoryEntry,
    title: String,
    now: DateTime<Utc>,
) -> Result<CountryDetail, NormalizeError> {
    let mut fields = into_fields(raw)?;

    let last_modified = article_date(fields.get(ARTICLE_START_DATE), now).timestamp();
    let advice = advice_levels(fields.get(ADVICE_LEVELS))?;
    let summary = match fields.get(SUMMARY_HTML) {
        Some(Value::String(html)) if !html.is_empty() => strip_markup(html),
        _ => String::new(),
    };

    drop_keys(&mut fields, &[ARTICLE_START_DATE, SUMMARY_HTML, ADVICE_LEVELS]);
    drop_keys(&mut fields, SUMMARY_KEYS);
    drop_keys(&mut fields, DETAIL_KEYS);

    Ok(CountryDetail {
        title,
        summary,
        country: CountrySummary {
            identifier: entry.identifier.clone(),
            url: entry.url.clone(),
            last_modified,
            advice_issued: advice.issued,
            advice: advice.items,
            extra: fields,
        },
    })
}

/// Normalize every entry of the list, dropping the ones that fail.
///
/// A bad entry never aborts the batch. Source order is kept.
pub fn normalize_list(entries: Vec<Value>, base_url: &Url, now: DateTime<Utc>) -> Vec<CountrySummary> {
    let total = entries.len();

    let countries: Vec<CountrySummary> = entries
        .into_iter()
        .enumerate()
        .fold(Vec::with_capacity(total), |mut kept, (index, raw)| {
            match normalize_list_entry(raw, base_url, now) {
                Ok(country) => kept.push(country),
                Err(e) => debug!("Dropping list entry {}: {}", index, e),
            }
            kept
        });

    if countries.len() < total {
        info!("Kept {} of {} list entries", countries.len(), total);
    }

    countries
}
