//! Normalized advisory records as republished to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// One country from the directory listing.
///
/// Fields the site publishes that are not normalized here are carried
/// through unchanged in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySummary {
    #[serde(rename = "NormalizedTitle")]
    pub identifier: String,
    #[serde(rename = "URL")]
    pub url: Url,
    #[serde(rename = "LastModified", with = "rfc3339_millis")]
    pub last_modified: DateTime<Utc>,
    #[serde(rename = "AdviceIssued")]
    pub advice_issued: bool,
    #[serde(rename = "Advice")]
    pub advice: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CountrySummary {
    /// The part of the record the directory keeps.
    pub fn directory_entry(&self) -> DirectoryEntry {
        DirectoryEntry {
            identifier: self.identifier.clone(),
            url: self.url.clone(),
        }
    }
}

/// One country's detail page, normalized. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDetail {
    #[serde(rename = "Title")]
    pub title: String,
    /// Plain-text summary with markup stripped.
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(flatten)]
    pub country: CountrySummary,
}

/// Identifier to detail-page URL mapping held by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub identifier: String,
    pub url: Url,
}

/// Timestamps as RFC 3339 with millisecond precision, e.g. `2017-12-15T03:22:46.000Z`.
mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fiji() -> CountrySummary {
        let mut extra = Map::new();
        extra.insert("Region".to_string(), json!("Pacific"));
        CountrySummary {
            identifier: "fiji".to_string(),
            url: Url::parse("https://example.gov/info/fiji.aspx").unwrap(),
            last_modified: DateTime::from_timestamp_millis(1513308166000).unwrap(),
            advice_issued: true,
            advice: vec![json!({"level": 1})],
            extra,
        }
    }

    #[test]
    fn test_summary_wire_format() {
        let value = serde_json::to_value(fiji()).unwrap();
        assert_eq!(
            value,
            json!({
                "NormalizedTitle": "fiji",
                "URL": "https://example.gov/info/fiji.aspx",
                "LastModified": "2017-12-15T03:22:46.000Z",
                "AdviceIssued": true,
                "Advice": [{"level": 1}],
                "Region": "Pacific"
            })
        );
    }

    #[test]
    fn test_detail_flattens_summary() {
        let detail = CountryDetail {
            title: "Fiji".to_string(),
            summary: "Exercise normal safety precautions".to_string(),
            country: fiji(),
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["Title"], "Fiji");
        assert_eq!(value["NormalizedTitle"], "fiji");
        assert_eq!(value["Region"], "Pacific");

        let back: CountryDetail = serde_json::from_value(value).unwrap();
        assert_eq!(back, detail);
    }

    #[test]
    fn test_directory_entry() {
        let entry = fiji().directory_entry();
        assert_eq!(entry.identifier, "fiji");
        assert_eq!(entry.url.as_str(), "https://example.gov/info/fiji.aspx");
    }
}
