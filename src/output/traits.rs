//! Statistics sink trait and result record
//!
//! This module defines the trait interface the crawl core reports to and the
//! record it reports: one [`WorkResult`] per executed crawl task.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Outcome of one executed crawl task
#[derive(Debug, Clone, PartialEq)]
pub struct WorkResult {
    /// Page (or sitemap) the URL was discovered on
    pub parent_url: Url,

    /// The fetched URL
    pub url: Url,

    /// Worker that executed the task
    pub worker_id: usize,

    /// Number of workers in the pool
    pub pool_size: usize,

    /// Response size in bytes
    pub response_size: u64,

    /// HTTP status code
    pub status_code: u16,

    /// When the fetch started
    pub start_time: DateTime<Utc>,

    /// When the fetch completed
    pub end_time: DateTime<Utc>,

    /// Content-Type header value
    pub content_type: String,
}

impl WorkResult {
    /// Returns how long the fetch took
    pub fn duration(&self) -> Duration {
        (self.end_time - self.start_time).to_std().unwrap_or_default()
    }

    /// Returns true for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Receiver of crawl results
///
/// Called exactly once per executed task, from worker tasks running concurrently.
/// Implementations must be thread-safe and must not block for long.
pub trait StatsSink: Send + Sync {
    /// Records the result of one executed task
    fn record(&self, result: WorkResult);
}

/// Sink that logs every result and optionally forwards it
#[derive(Clone, Default)]
pub struct TracingSink {
    inner: Option<Arc<dyn StatsSink>>,
}

impl TracingSink {
    /// Creates a sink that only logs
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that logs, then forwards to `inner`
    pub fn wrapping(inner: Arc<dyn StatsSink>) -> Self {
        Self { inner: Some(inner) }
    }
}

impl StatsSink for TracingSink {
    fn record(&self, result: WorkResult) {
        tracing::debug!(
            "[worker {}/{}] {} {} ({} bytes, {:?}, {}) from {}",
            result.worker_id,
            result.pool_size,
            result.status_code,
            result.url,
            result.response_size,
            result.duration(),
            result.content_type,
            result.parent_url
        );

        if let Some(inner) = &self.inner {
            inner.record(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecSink(Mutex<Vec<WorkResult>>);

    impl StatsSink for VecSink {
        fn record(&self, result: WorkResult) {
            self.0.lock().unwrap().push(result);
        }
    }

    fn result(status_code: u16) -> WorkResult {
        let start_time = Utc::now();
        WorkResult {
            parent_url: Url::parse("http://example.com/sitemap.xml").unwrap(),
            url: Url::parse("http://example.com/").unwrap(),
            worker_id: 0,
            pool_size: 1,
            response_size: 10,
            status_code,
            start_time,
            end_time: start_time + ChronoDuration::milliseconds(250),
            content_type: "text/html".to_string(),
        }
    }

    #[test]
    fn test_duration() {
        assert_eq!(result(200).duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_is_success() {
        assert!(result(200).is_success());
        assert!(result(204).is_success());
        assert!(!result(301).is_success());
        assert!(!result(500).is_success());
    }

    #[test]
    fn test_tracing_sink_forwards() {
        let inner = Arc::new(VecSink::default());
        let sink = TracingSink::wrapping(inner.clone());

        sink.record(result(200));
        sink.record(result(404));

        let recorded = inner.0.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1].status_code, 404);
    }
}
