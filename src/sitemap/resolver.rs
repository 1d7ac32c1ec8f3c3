//! Sitemap resolution
//!
//! A sitemap root is probed twice, once as a sitemap index and once as a flat
//! sitemap, and the URLs of every probe that recognizes the document are merged.
//! Children of an index are always read as flat sitemaps; there is no deeper
//! recursion.

use crate::crawler::{FetchedPage, Fetcher};
use crate::sitemap::types::{parse_sitemap_index, parse_url_set};
use crate::sitemap::SitemapError;
use std::sync::Arc;
use url::Url;

/// Resolves a sitemap root into the page URLs it describes
pub struct SitemapResolver {
    fetcher: Arc<dyn Fetcher>,
}

impl SitemapResolver {
    /// Creates a resolver that fetches documents through `fetcher`
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Returns every page URL described by the sitemap at `root`
    ///
    /// # Probe Outcomes
    ///
    /// | Index probe | Flat probe | Result |
    /// |-------------|------------|--------|
    /// | ok | ok | index URLs followed by flat URLs |
    /// | ok | failed | index URLs |
    /// | failed | ok | flat URLs |
    /// | not this format | not this format | `NeitherFormat` |
    /// | failed | failed | first failure that is not a format mismatch |
    ///
    /// A root document that cannot be fetched fails resolution outright.
    pub async fn resolve(&self, root: &Url) -> Result<Vec<Url>, SitemapError> {
        let document = self.fetch_document(root).await?;
        let text = document.body_text();

        let from_index = self.resolve_index(root, &text).await;
        let from_flat = urls_from_flat(root, &text);

        match &from_index {
            Ok(index_urls) => {
                tracing::debug!("{} is a sitemap index with {} URLs", root, index_urls.len())
            }
            Err(e) => tracing::debug!("Index probe for {} failed: {}", root, e),
        }
        match &from_flat {
            Ok(flat_urls) => tracing::debug!("{} is a sitemap with {} URLs", root, flat_urls.len()),
            Err(e) => tracing::debug!("Sitemap probe for {} failed: {}", root, e),
        }

        let urls = match (from_index, from_flat) {
            (Ok(mut index_urls), Ok(flat_urls)) => {
                index_urls.extend(flat_urls);
                index_urls
            }
            (Ok(urls), Err(_)) | (Err(_), Ok(urls)) => urls,
            (Err(index_error), Err(flat_error)) => {
                return Err(if index_error.is_invalid_content() && flat_error.is_invalid_content() {
                    SitemapError::NeitherFormat {
                        url: root.to_string(),
                    }
                } else if !index_error.is_invalid_content() {
                    index_error
                } else {
                    flat_error
                });
            }
        };

        tracing::info!("Resolved {} URLs from sitemap {}", urls.len(), root);
        Ok(urls)
    }

    /// Reads `text` as a sitemap index and resolves each child as a flat sitemap
    async fn resolve_index(&self, root: &Url, text: &str) -> Result<Vec<Url>, SitemapError> {
        let entries = parse_sitemap_index(text).map_err(|reason| SitemapError::InvalidContent {
            url: root.to_string(),
            reason,
        })?;

        tracing::debug!("Sitemap index {} lists {} child sitemaps", root, entries.len());

        let mut urls = Vec::new();
        for entry in entries {
            let child = parse_location(&entry.loc)?;
            let child_urls = self.resolve_flat(&child).await.map_err(|e| {
                SitemapError::ChildSitemap {
                    url: child.to_string(),
                    source: Box::new(e),
                }
            })?;
            urls.extend(child_urls);
        }

        Ok(urls)
    }

    /// Fetches `url` and reads it as a flat sitemap
    async fn resolve_flat(&self, url: &Url) -> Result<Vec<Url>, SitemapError> {
        let document = self.fetch_document(url).await?;
        urls_from_flat(url, &document.body_text())
    }

    /// Fetches a sitemap document, rejecting non-success responses
    async fn fetch_document(&self, url: &Url) -> Result<FetchedPage, SitemapError> {
        let page = self.fetcher.fetch(url).await?;

        if !page.is_success() {
            return Err(SitemapError::HttpStatus {
                url: url.to_string(),
                status: page.status_code,
            });
        }

        Ok(page)
    }
}

/// Reads `text` as a flat sitemap
fn urls_from_flat(url: &Url, text: &str) -> Result<Vec<Url>, SitemapError> {
    let entries = parse_url_set(text).map_err(|reason| SitemapError::InvalidContent {
        url: url.to_string(),
        reason,
    })?;

    entries
        .iter()
        .map(|entry| parse_location(&entry.loc))
        .collect()
}

/// Parses the text of a `<loc>` element
fn parse_location(loc: &str) -> Result<Url, SitemapError> {
    let loc = loc.trim();
    Url::parse(loc).map_err(|source| SitemapError::InvalidLocation {
        loc: loc.to_string(),
        source,
    })
}
