//! In-memory fetcher for tests
//!
//! Serves canned responses so crawl logic can be exercised without a server.

use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::url::canonical_key;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use url::Url;

/// In-memory [`Fetcher`] serving canned responses keyed by canonical URL
///
/// Records how many times each URL was requested. An optional delay is applied
/// to every fetch to simulate slow servers.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, FetchedPage>,
    requests: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl StaticFetcher {
    /// Creates an empty fetcher; every URL is a transport failure until registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response for `url`
    pub fn with_page(mut self, url: &str, page: FetchedPage) -> Self {
        let key = Url::parse(url)
            .map(|u| canonical_key(&u))
            .unwrap_or_else(|_| url.to_string());
        self.pages.insert(key, page);
        self
    }

    /// Registers a `200 text/html` response
    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_page(url, FetchedPage::new(200, "text/html; charset=utf-8", html))
    }

    /// Registers a `200 application/xml` response
    pub fn with_xml(self, url: &str, xml: &str) -> Self {
        self.with_page(url, FetchedPage::new(200, "application/xml", xml))
    }

    /// Delays every fetch by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns how many times `url` was fetched
    pub fn request_count(&self, url: &str) -> usize {
        let key = Url::parse(url)
            .map(|u| canonical_key(&u))
            .unwrap_or_else(|_| url.to_string());
        self.lock_requests().get(&key).copied().unwrap_or(0)
    }

    fn lock_requests(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let key = canonical_key(url);
        *self.lock_requests().entry(key.clone()).or_insert(0) += 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.pages
            .get(&key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_requests_per_url() {
        let fetcher = StaticFetcher::new().with_html("http://example.com/", "<html></html>");
        let url = Url::parse("http://example.com/").unwrap();

        assert!(fetcher.fetch(&url).await.is_ok());
        assert!(fetcher.fetch(&url).await.is_ok());

        let missing = Url::parse("http://example.com/missing").unwrap();
        assert!(matches!(
            fetcher.fetch(&missing).await,
            Err(FetchError::NotFound { .. })
        ));

        assert_eq!(fetcher.request_count("http://example.com/"), 2);
        assert_eq!(fetcher.request_count("http://example.com/missing#top"), 1);
    }
}
