//! HTML link extraction
//!
//! This module parses an HTML document and returns the absolute, same-host URLs
//! of every `<a href>` it contains, resolved against the document's base.

use crate::url::{normalize_url, origin_prefix, same_host};
use scraper::{Html, Selector};
use url::Url;

/// Schemes that never address a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Extracts in-scope links from an HTML document
///
/// # Resolution Rules
///
/// The effective base is the first `<base href>` of the document. A root-relative
/// base is prefixed with `scheme://host` of `base_url`. Without a `<base>` element
/// the directory of `base_url` is used.
///
/// For each `<a href>`:
/// - `/path` resolves against `scheme://host` of `base_url`
/// - `http://…` and `https://…` are kept as-is
/// - anything else is joined to the effective base with a single `/`
/// - the fragment is cut at the first `#`
/// - results that do not parse as URLs are dropped
/// - results on a different host than `base_url` are dropped
///
/// `javascript:`, `mailto:`, `tel:` and `data:` links are skipped. Duplicates are
/// kept; deduplication happens in the frontier.
///
/// # Example
///
/// ```
/// use sitemap_crawler::crawler::extract_links;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/a/").unwrap();
/// let html = r#"<a href="/x">x</a><a href="http://other.com/w">w</a>"#;
/// let links = extract_links(&base, html);
/// assert_eq!(links, vec![Url::parse("http://example.com/x").unwrap()]);
/// ```
pub fn extract_links(base_url: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let origin = origin_prefix(base_url);
    let base = effective_base(&document, base_url, &origin);

    let mut links = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(absolute) = resolve_href(href, &base, &origin) else {
            continue;
        };

        let url = match normalize_url(&absolute) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Dropping link {} found on {}: {}", absolute, base_url, e);
                continue;
            }
        };

        if !same_host(&url, base_url) {
            continue;
        }

        links.push(url);
    }

    links
}

/// Determines the base that relative links are joined to
fn effective_base(document: &Html, base_url: &Url, origin: &str) -> String {
    let declared = Selector::parse("base[href]").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
    });

    match declared {
        Some(href) if href.starts_with('/') => format!("{}{}", origin, href),
        Some(href) => href,
        None => directory_of(base_url, origin),
    }
}

/// Returns `scheme://host` plus the path of `url` up to and including its last `/`
fn directory_of(url: &Url, origin: &str) -> String {
    let path = url.path();
    let directory = path.rfind('/').map_or("/", |idx| &path[..=idx]);
    format!("{}{}", origin, directory)
}

/// Turns one href into an absolute URL string, or `None` if it must be skipped
fn resolve_href(href: &str, base: &str, origin: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let absolute = if href.starts_with('/') {
        format!("{}{}", origin, href)
    } else if lower.starts_with("http://") || lower.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), href)
    };

    Some(strip_fragment(&absolute).to_string())
}

/// Cuts a URL string at its first `#`
fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(hash_position) => &url[..hash_position],
        None => url,
    }
}
