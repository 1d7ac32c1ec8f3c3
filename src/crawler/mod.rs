//! Crawler module for sitemap-driven crawling
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - HTML parsing and same-host link extraction
//! - The deduplicating frontier and the worker pool
//! - Overall crawl coordination

#[cfg(test)]
mod canned;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod pool;
mod task;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{
    build_http_client, is_html_content_type, FetchError, FetchedPage, Fetcher, HttpFetcher,
};
pub use frontier::{Frontier, FrontierClosed};
pub use parser::extract_links;
pub use pool::{PoolCompletion, PoolStopped, Work, WorkerContext, WorkerPool};
pub use task::{CrawlJob, CrawlTask};

#[cfg(test)]
pub(crate) use canned::StaticFetcher;

use crate::config::{validate_options, Config, CrawlOptions};
use crate::output::StatsSink;
use crate::CrawlerError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the crawl options derived from `config`
/// 2. Build the HTTP fetcher
/// 3. Resolve the sitemap and seed the frontier
/// 4. Fetch pages and follow same-host links until drained or stopped
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `sitemap_url` - Sitemap or sitemap index to seed from
/// * `sink` - Receives one result per fetched page
/// * `stop` - Cancelling it ends the crawl early
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished or was stopped
/// * `Err(CrawlerError)` - Crawl could not start
pub async fn crawl(
    config: &Config,
    sitemap_url: &Url,
    sink: Arc<dyn StatsSink>,
    stop: CancellationToken,
) -> Result<CrawlReport, CrawlerError> {
    let options = CrawlOptions::from(&config.crawler);
    validate_options(&options)?;

    let fetcher = HttpFetcher::new(&config.user_agent, options.timeout)?;

    Coordinator::new(options, Arc::new(fetcher), sink)
        .with_stop_signal(stop)
        .run(sitemap_url)
        .await
}
