use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent fetch workers
    pub concurrency: usize,

    /// Per-request timeout applied by the HTTP fetcher (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Maximum number of crawl tasks waiting in the frontier queue
    #[serde(rename = "frontier-capacity")]
    pub frontier_capacity: usize,

    /// Maximum number of jobs waiting in the worker pool queue
    #[serde(rename = "pool-queue-capacity")]
    pub pool_queue_capacity: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: CrawlOptions::DEFAULT_CONCURRENCY,
            timeout_secs: CrawlOptions::DEFAULT_TIMEOUT.as_secs(),
            frontier_capacity: CrawlOptions::DEFAULT_FRONTIER_CAPACITY,
            pool_queue_capacity: CrawlOptions::DEFAULT_POOL_QUEUE_CAPACITY,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `CrawlerName/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the markdown summary file, if one should be written
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}

/// Immutable runtime options for one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Number of concurrent workers (> 0)
    pub concurrency: usize,

    /// Timeout handed to the fetcher
    pub timeout: Duration,

    /// Capacity of the frontier queue, independent of the seed count
    pub frontier_capacity: usize,

    /// Capacity of the worker pool's job queue
    pub pool_queue_capacity: usize,
}

impl CrawlOptions {
    pub const DEFAULT_CONCURRENCY: usize = 8;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_FRONTIER_CAPACITY: usize = 10_000;
    pub const DEFAULT_POOL_QUEUE_CAPACITY: usize = 16;

    /// Creates options with the given concurrency and timeout and default capacities
    pub fn new(concurrency: usize, timeout: Duration) -> Self {
        Self {
            concurrency,
            timeout,
            ..Self::default()
        }
    }

    /// Sets the frontier queue capacity
    pub fn with_frontier_capacity(mut self, capacity: usize) -> Self {
        self.frontier_capacity = capacity;
        self
    }

    /// Sets the worker pool queue capacity
    pub fn with_pool_queue_capacity(mut self, capacity: usize) -> Self {
        self.pool_queue_capacity = capacity;
        self
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            concurrency: Self::DEFAULT_CONCURRENCY,
            timeout: Self::DEFAULT_TIMEOUT,
            frontier_capacity: Self::DEFAULT_FRONTIER_CAPACITY,
            pool_queue_capacity: Self::DEFAULT_POOL_QUEUE_CAPACITY,
        }
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            timeout: Duration::from_secs(config.timeout_secs),
            frontier_capacity: config.frontier_capacity,
            pool_queue_capacity: config.pool_queue_capacity,
        }
    }
}
