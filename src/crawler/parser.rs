//! HTML link extraction
//!
//! Turns a fetched page into the set of absolute http(s) URLs it links to.

use crate::url::normalize_parsed;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts every outbound link of an HTML page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`, resolved against `<base href>` when the page has one,
///   otherwise against the page URL
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only links (same-page anchors)
/// - Anything that is not http(s) after resolution
///
/// Fragments are stripped, so `/page#a` and `/page#b` are one link.
///
/// # Example
///
/// ```
/// use broken_links::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page#top">Link</a></body></html>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base);
/// assert!(links.contains(&Url::parse("https://example.com/page").unwrap()));
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> HashSet<Url> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);

    let mut links = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, &base) {
                    links.insert(absolute_url);
                }
            }
        }
    }

    links
}

/// Returns the base URL for relative links: `<base href>` or the page URL
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Resolves a link href to an absolute URL and validates it
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    normalize_parsed(absolute_url).ok()
}
