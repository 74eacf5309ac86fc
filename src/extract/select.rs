//! Structural DOM queries against the advisory site's page templates.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Which child of the matched target element(s) to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPosition {
    Last,
    /// Zero-based index among element children.
    Nth(usize),
}

/// A fixed DOM position: child `child` of every `target` found inside `scope`.
#[derive(Debug, Clone, Copy)]
pub struct StructuralQuery {
    pub scope: &'static str,
    pub target: &'static str,
    pub child: ChildPosition,
}

/// The block holding the embedded country list on the list page.
pub const LIST_QUERY: StructuralQuery = StructuralQuery {
    scope: "#rs_read_this",
    target: ".content__main",
    child: ChildPosition::Last,
};

/// The block holding the embedded country record on a detail page.
pub const DETAIL_QUERY: StructuralQuery = StructuralQuery {
    scope: "#rs_read_this",
    target: ".span-md-6.push-md-3.content__main",
    child: ChildPosition::Nth(4),
};

/// Page heading on a detail page.
pub const TITLE_SELECTOR: &str = "#page-title";

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("no markup found for {target} in {scope}")]
    NotFound {
        scope: &'static str,
        target: &'static str,
    },

    #[error("invalid selector {selector}: {message}")]
    InvalidSelector { selector: String, message: String },
}

fn parse_selector(selector: &str) -> Result<Selector, SelectError> {
    Selector::parse(selector).map_err(|e| SelectError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Return the inner markup at `query`'s position in `html`.
///
/// Element children of all matched targets are considered in document order
/// before the position is applied. An empty inner markup counts as not found.
pub fn select(html: &str, query: &StructuralQuery) -> Result<String, SelectError> {
    let document = Html::parse_document(html);
    let scope = parse_selector(query.scope)?;
    let target = parse_selector(query.target)?;

    let children: Vec<ElementRef> = document
        .select(&scope)
        .flat_map(|scope_el| scope_el.select(&target))
        .flat_map(|target_el| target_el.children().filter_map(ElementRef::wrap))
        .collect();

    let chosen = match query.child {
        ChildPosition::Last => children.last(),
        ChildPosition::Nth(index) => children.get(index),
    };

    match chosen.map(|el| el.inner_html()) {
        Some(markup) if !markup.is_empty() => Ok(markup),
        _ => Err(SelectError::NotFound {
            scope: query.scope,
            target: query.target,
        }),
    }
}

/// Concatenated text of every element matching `selector`, trimmed.
///
/// Returns an empty string when nothing matches.
pub fn select_text(html: &str, selector: &str) -> Result<String, SelectError> {
    let document = Html::parse_document(html);
    let selector = parse_selector(selector)?;

    let text: String = document
        .select(&selector)
        .flat_map(|el| el.text())
        .collect();

    Ok(text.trim().to_string())
}

/// Text content of an HTML fragment with all markup removed, trimmed.
pub fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_PAGE: &str = r#"<html><body>
        <div id="rs_read_this">
          <div class="content__main">
            <p>Intro</p>
            <div class="blob">var countries = [{"a":1}];</div>
          </div>
        </div>
        </body></html>"#;

    #[test]
    fn test_select_last_child() {
        let markup = select(LIST_PAGE, &LIST_QUERY).unwrap();
        assert_eq!(markup, r#"var countries = [{"a":1}];"#);
    }

    #[test]
    fn test_select_nth_child() {
        let html = r#"<div id="rs_read_this">
            <div class="span-md-6 push-md-3 content__main">
              <p>0</p><p>1</p><p>2</p><p>3</p><div>{"Title":"Fiji"}</div><p>5</p>
            </div></div>"#;
        let markup = select(html, &DETAIL_QUERY).unwrap();
        assert_eq!(markup, r#"{"Title":"Fiji"}"#);
    }

    #[test]
    fn test_select_ignores_target_outside_scope() {
        let html = r#"<div class="content__main"><p>outside</p></div>"#;
        assert!(matches!(
            select(html, &LIST_QUERY),
            Err(SelectError::NotFound { .. })
        ));
    }

    #[test]
    fn test_select_missing_child_index() {
        let html = r#"<div id="rs_read_this">
            <div class="span-md-6 push-md-3 content__main"><p>0</p><p>1</p></div></div>"#;
        assert!(matches!(
            select(html, &DETAIL_QUERY),
            Err(SelectError::NotFound { .. })
        ));
    }

    #[test]
    fn test_select_empty_markup_is_not_found() {
        let html = r#"<div id="rs_read_this"><div class="content__main"><p>x</p><span></span></div></div>"#;
        assert!(matches!(
            select(html, &LIST_QUERY),
            Err(SelectError::NotFound { .. })
        ));
    }

    #[test]
    fn test_select_text_trims() {
        let html = r#"<h1 id="page-title">
              Fiji
           </h1>"#;
        assert_eq!(select_text(html, TITLE_SELECTOR).unwrap(), "Fiji");
        assert_eq!(select_text("<p>none</p>", TITLE_SELECTOR).unwrap(), "");
    }

    #[test]
    fn test_strip_markup() {
        let html = "  <p>Exercise a <strong>high degree</strong> of caution &amp; care.</p>\n";
        assert_eq!(
            strip_markup(html),
            "Exercise a high degree of caution & care."
        );
        assert_eq!(strip_markup(""), "");
    }
}
