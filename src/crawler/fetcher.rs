//! Page fetching
//!
//! This module defines the [`Fetcher`] seam the crawl core depends on, and the
//! default HTTP implementation built on `reqwest`:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests returning body, status, timing and content type
//! - HTML classification from the Content-Type header
//! - Error classification (timeout vs. other transport failures)

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::CONTENT_TYPE, Client};
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors produced by a fetch attempt that yielded no response
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[cfg(test)]
    #[error("No response registered for {url}")]
    NotFound { url: String },
}

/// A fetched document and its response metadata
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Raw response body
    pub body: Vec<u8>,

    /// Response size in bytes
    pub size: u64,

    /// HTTP status code
    pub status_code: u16,

    /// When the request was sent
    pub start_time: DateTime<Utc>,

    /// When the body was fully read
    pub end_time: DateTime<Utc>,

    /// Content-Type header value (empty if absent)
    pub content_type: String,

    /// Whether the response is an HTML document
    pub is_html: bool,
}

impl FetchedPage {
    /// Builds a page from a body and content type, classifying it as HTML or not
    ///
    /// Start and end times are both set to now; use this for responses that do not
    /// come off the wire (tests, caches).
    pub fn new(status_code: u16, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let content_type = content_type.into();
        let body = body.into();
        let now = Utc::now();

        Self {
            size: body.len() as u64,
            is_html: is_html_content_type(&content_type),
            body,
            status_code,
            start_time: now,
            end_time: now,
            content_type,
        }
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns true for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Returns how long the fetch took
    pub fn elapsed(&self) -> Duration {
        (self.end_time - self.start_time).to_std().unwrap_or_default()
    }
}

/// Performs the network fetch for one URL
///
/// Implementations must be shareable across worker tasks.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, returning the response or the transport failure
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Returns true if a Content-Type header value denotes an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitemap_crawler::config::UserAgentConfig;
/// use sitemap_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Default [`Fetcher`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, timeout)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL with a single GET request
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Any HTTP status | `Ok(FetchedPage)` with that status |
    /// | Timeout | `Err(FetchError::Timeout)` |
    /// | Connection/TLS/redirect failure | `Err(FetchError::Request)` |
    /// | Body read failure | `Err(FetchError::Body)` |
    ///
    /// Failed fetches are not retried.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let start_time = Utc::now();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        let page = FetchedPage {
            size: body.len() as u64,
            is_html: is_html_content_type(&content_type),
            body: body.to_vec(),
            status_code,
            start_time,
            end_time: Utc::now(),
            content_type,
        };

        tracing::trace!(
            "Fetched {} ({} bytes, status {}) in {:?}",
            url,
            page.size,
            page.status_code,
            page.elapsed()
        );

        Ok(page)
    }
}

/// Classifies a send error
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            source: error,
        }
    }
}
