//! Locating and parsing the JSON value embedded in a markup fragment.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Shape of the embedded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Array,
    Object,
}

impl JsonKind {
    fn brackets(self) -> (u8, u8) {
        match self {
            JsonKind::Array => (b'[', b']'),
            JsonKind::Object => (b'{', b'}'),
        }
    }
}

/// How the end of the embedded value is located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// First opener through the last closer in the fragment.
    #[default]
    Outermost,
    /// First opener through its matching closer, ignoring brackets in strings.
    Balanced,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no opening bracket in markup")]
    NoOpenBracket,

    #[error("no closing bracket after the opening bracket")]
    NoCloseBracket,

    #[error("embedded JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("embedded JSON was empty or of the wrong type")]
    EmptyOrWrongType,
}

/// Extract the embedded JSON value of `kind` from `markup`.
///
/// Arrays must be non-empty.
pub fn extract(markup: &str, kind: JsonKind, mode: ScanMode) -> Result<Value, ExtractionError> {
    let (open, close) = kind.brackets();
    let bytes = markup.as_bytes();

    let start = bytes
        .iter()
        .position(|&b| b == open)
        .ok_or(ExtractionError::NoOpenBracket)?;

    let end = match mode {
        ScanMode::Outermost => bytes.iter().rposition(|&b| b == close),
        ScanMode::Balanced => matching_close(bytes, start, open, close),
    }
    .filter(|&end| end > start)
    .ok_or(ExtractionError::NoCloseBracket)?;

    // Both bounds sit on ASCII bytes, so the slice is on char boundaries.
    let value: Value = serde_json::from_str(&markup[start..=end])?;

    let valid = match kind {
        JsonKind::Array => value.as_array().is_some_and(|items| !items.is_empty()),
        JsonKind::Object => value.is_object(),
    };
    if !valid {
        return Err(ExtractionError::EmptyOrWrongType);
    }

    Ok(value)
}

/// Index of the closer matching the opener at `start`, skipping string literals.
fn matching_close(bytes: &[u8], start: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(start + offset);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_array_from_junk() {
        let value = extract(
            r#"<div>junk[{"a":1}]junk</div>"#,
            JsonKind::Array,
            ScanMode::Outermost,
        )
        .unwrap();
        assert_eq!(value, json!([{"a": 1}]));
    }

    #[test]
    fn test_extract_no_open_bracket() {
        let err = extract("<div>nothing here</div>", JsonKind::Array, ScanMode::Outermost);
        assert!(matches!(err, Err(ExtractionError::NoOpenBracket)));
    }

    #[test]
    fn test_extract_close_before_open() {
        let err = extract("<div>] then [</div>", JsonKind::Array, ScanMode::Outermost);
        assert!(matches!(err, Err(ExtractionError::NoCloseBracket)));

        let err = extract("<div>[ never closed</div>", JsonKind::Array, ScanMode::Outermost);
        assert!(matches!(err, Err(ExtractionError::NoCloseBracket)));
    }

    #[test]
    fn test_extract_parse_failure() {
        let err = extract("<p>[1, 2,, 3]</p>", JsonKind::Array, ScanMode::Outermost);
        assert!(matches!(err, Err(ExtractionError::Parse(_))));
    }

    #[test]
    fn test_extract_empty_array_rejected() {
        let err = extract("<p>var x = [];</p>", JsonKind::Array, ScanMode::Outermost);
        assert!(matches!(err, Err(ExtractionError::EmptyOrWrongType)));
    }

    #[test]
    fn test_extract_object() {
        let markup = r#"<script>var country = {"Title":"Fiji","Tags":["a"]};</script>"#;
        let value = extract(markup, JsonKind::Object, ScanMode::Outermost).unwrap();
        assert_eq!(value["Title"], "Fiji");
    }

    #[test]
    fn test_outermost_is_fooled_by_trailing_brackets() {
        let markup = r#"<p>[{"a":1}]</p><p>see [note]</p>"#;
        let err = extract(markup, JsonKind::Array, ScanMode::Outermost);
        assert!(matches!(err, Err(ExtractionError::Parse(_))));
    }

    #[test]
    fn test_balanced_stops_at_matching_close() {
        let markup = r#"<p>[{"a":"x]y","b":[2]}]</p><p>see [note]</p>"#;
        let value = extract(markup, JsonKind::Array, ScanMode::Balanced).unwrap();
        assert_eq!(value, json!([{"a": "x]y", "b": [2]}]));
    }

    #[test]
    fn test_balanced_handles_escaped_quotes() {
        let markup = r#"{"a":"say \"}\" twice"} trailing }"#;
        let value = extract(markup, JsonKind::Object, ScanMode::Balanced).unwrap();
        assert_eq!(value, json!({"a": "say \"}\" twice"}));
    }

    #[test]
    fn test_balanced_unclosed() {
        let err = extract(r#"[{"a":1}"#, JsonKind::Array, ScanMode::Balanced);
        assert!(matches!(err, Err(ExtractionError::NoCloseBracket)));
    }
}
