//! sitemap-crawler: a concurrent sitemap-driven site crawler
//!
//! This crate resolves a site's XML sitemap (flat or index), seeds a deduplicating
//! frontier with every page it lists, and fetches those pages through a fixed-size
//! worker pool, following same-host links discovered along the way.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sitemap;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] sitemap::SitemapError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlOptions};
pub use crawler::{Coordinator, CrawlReport};
pub use output::{StatsCollector, StatsSink, WorkResult};
pub use sitemap::SitemapResolver;
pub use crate::url::{canonical_key, normalize_url, same_host};
