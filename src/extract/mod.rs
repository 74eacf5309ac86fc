//! Pulling the embedded JSON blob out of advisory pages.
//!
//! - `select`: fixed structural DOM queries and markup stripping
//! - `json`: bracket scanning and parsing of the embedded value

mod json;
mod select;

pub use json::{extract, ExtractionError, JsonKind, ScanMode};
pub use select::{
    select, select_text, strip_markup, ChildPosition, SelectError, StructuralQuery, DETAIL_QUERY,
    LIST_QUERY, TITLE_SELECTOR,
};
