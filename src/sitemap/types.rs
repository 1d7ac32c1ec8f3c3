//! Sitemap XML document shapes
//!
//! Both probes deserialize the same document; root element names are not checked,
//! a document is recognized by the entries it carries.

use quick_xml::de::from_str;
use serde::Deserialize;

/// A `<sitemap>` entry of a sitemap index
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapIndexEntry {
    pub loc: String,
}

/// A `<url>` entry of a flat sitemap
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapUrlEntry {
    pub loc: String,
}

#[derive(Debug, Deserialize)]
struct SitemapIndexDocument {
    #[serde(default, rename = "sitemap")]
    sitemaps: Vec<SitemapIndexEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlSetDocument {
    #[serde(default, rename = "url")]
    urls: Vec<SitemapUrlEntry>,
}

/// Parses a sitemap index, returning its entries
///
/// Fails with a reason when the document is not well-formed XML or has no
/// `<sitemap>` entries.
pub fn parse_sitemap_index(xml: &str) -> Result<Vec<SitemapIndexEntry>, String> {
    let document: SitemapIndexDocument = from_str(xml).map_err(|e| e.to_string())?;

    if document.sitemaps.is_empty() {
        return Err("no <sitemap> entries".to_string());
    }

    Ok(document.sitemaps)
}

/// Parses a flat sitemap, returning its entries
///
/// Fails with a reason when the document is not well-formed XML or has no
/// `<url>` entries.
pub fn parse_url_set(xml: &str) -> Result<Vec<SitemapUrlEntry>, String> {
    let document: UrlSetDocument = from_str(xml).map_err(|e| e.to_string())?;

    if document.urls.is_empty() {
        return Err("no <url> entries".to_string());
    }

    Ok(document.urls)
}
