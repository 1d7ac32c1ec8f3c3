//! Sitemap module
//!
//! Turns a sitemap root URL into the list of page URLs that seed a crawl.
//! Supports sitemap index documents (`<sitemap><loc>`) one level deep and flat
//! sitemaps (`<url><loc>`).

mod resolver;
mod types;

pub use resolver::SitemapResolver;
pub use types::{parse_sitemap_index, parse_url_set, SitemapIndexEntry, SitemapUrlEntry};

use crate::crawler::FetchError;
use thiserror::Error;

/// Errors that can occur while resolving a sitemap
#[derive(Debug, Error)]
pub enum SitemapError {
    /// The document is not of the probed shape
    #[error("{url} is not valid sitemap content: {reason}")]
    InvalidContent { url: String, reason: String },

    /// Neither probe recognized the root document
    #[error("{url:?} is neither a sitemap index nor a sitemap")]
    NeitherFormat { url: String },

    #[error("Invalid sitemap location {loc:?}: {source}")]
    InvalidLocation {
        loc: String,
        source: ::url::ParseError,
    },

    #[error("Child sitemap {url} failed: {source}")]
    ChildSitemap {
        url: String,
        source: Box<SitemapError>,
    },

    #[error("Sitemap {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl SitemapError {
    /// Returns true if this is a format mismatch rather than an entry-level failure
    pub fn is_invalid_content(&self) -> bool {
        matches!(self, Self::InvalidContent { .. })
    }
}
