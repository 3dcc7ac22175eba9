//! HTML link extraction
//!
//! Collects the raw `href` value of every anchor element. Resolution and scope
//! filtering happen afterwards in [`crate::url::normalize`].

use scraper::{Html, Selector};

/// Extracts every anchor `href` value from an HTML document
///
/// Values are returned as written (untrimmed, unresolved), in document order,
/// duplicates included. Malformed markup never fails; the HTML parser recovers
/// and whatever anchors it finds are returned.
///
/// # Example
///
/// ```
/// use scope_spider::crawler::extract_hrefs;
///
/// let html = r#"<html><body><a href="/apply">Apply</a><a name="top">Top</a></body></html>"#;
/// assert_eq!(extract_hrefs(html), vec!["/apply".to_string()]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
