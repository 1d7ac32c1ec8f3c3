//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the crawl together:
//! - Resolving the sitemap into seed URLs
//! - Seeding the frontier
//! - Deduplicating and dispatching frontier tasks to the worker pool
//! - Stopping on an external signal or when the frontier is drained

use crate::config::CrawlOptions;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::pool::{PoolStopped, WorkerPool};
use crate::crawler::task::CrawlJob;
use crate::output::StatsSink;
use crate::sitemap::SitemapResolver;
use crate::CrawlerError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// How often dispatch progress is logged
const PROGRESS_INTERVAL: usize = 100;

/// What a crawl run did
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Sitemap the run was seeded from
    pub sitemap_url: Url,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Total run time, sitemap resolution included
    pub elapsed: Duration,

    /// Tasks enqueued from the sitemap
    pub seeded: usize,

    /// Tasks handed to the worker pool
    pub dispatched: usize,

    /// Tasks skipped because their URL had already been seen
    pub duplicates_skipped: usize,

    /// Tasks dropped because the pool was stopping
    pub discarded: usize,

    /// Whether the run ended on the stop signal rather than a drained frontier
    pub stopped_early: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    options: CrawlOptions,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn StatsSink>,
    stop: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `options` - Worker count, capacities and timeout
    /// * `fetcher` - Performs every fetch, sitemaps included
    /// * `sink` - Receives one result per fetched page
    pub fn new(options: CrawlOptions, fetcher: Arc<dyn Fetcher>, sink: Arc<dyn StatsSink>) -> Self {
        Self {
            options,
            fetcher,
            sink,
            stop: CancellationToken::new(),
        }
    }

    /// Uses `stop` as the external stop signal
    pub fn with_stop_signal(mut self, stop: CancellationToken) -> Self {
        self.stop = stop;
        self
    }

    /// Returns the token that stops a running crawl when cancelled
    pub fn stop_signal(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Crawls every page reachable from `sitemap_url`
    ///
    /// Runs until the frontier is drained or the stop signal fires. In both cases
    /// the worker pool is stopped, in-flight fetches finish, and the frontier is
    /// closed only after the last worker has exited.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl ran to the end or was stopped
    /// * `Err(CrawlerError)` - The sitemap could not be resolved
    pub async fn run(&self, sitemap_url: &Url) -> Result<CrawlReport, CrawlerError> {
        let started_at = Utc::now();
        let timer = Instant::now();

        tracing::info!("Resolving sitemap {}", sitemap_url);
        let seeds = SitemapResolver::new(self.fetcher.clone())
            .resolve(sitemap_url)
            .await?;

        tracing::info!(
            "Starting crawl of {} seed URLs with {} workers",
            seeds.len(),
            self.options.concurrency
        );

        // A child token lets a drained frontier stop the pool without
        // cancelling the caller's token.
        let stop = self.stop.child_token();
        let frontier = Arc::new(Frontier::new(self.options.frontier_capacity));
        let seeding = frontier.seed(seeds, sitemap_url.clone());
        let (pool, mut completion) = WorkerPool::start(
            self.options.concurrency,
            self.options.pool_queue_capacity,
            stop.clone(),
        );
        tracing::debug!("Worker pool started with {} workers", pool.size());

        let mut dispatched = 0;
        let mut duplicates_skipped = 0;
        let mut discarded = 0;
        let mut drained = false;

        loop {
            tokio::select! {
                _ = &mut completion => {
                    frontier.close();
                    break;
                }
                _ = frontier.drained(), if !stop.is_cancelled() => {
                    tracing::info!("Frontier drained after {} pages, stopping workers", dispatched);
                    drained = true;
                    stop.cancel();
                }
                next = frontier.next() => {
                    let Some(task) = next else {
                        break;
                    };

                    if stop.is_cancelled() {
                        discarded += 1;
                        frontier.task_done();
                        continue;
                    }

                    if !frontier.mark_seen(task.target_url()) {
                        tracing::trace!("Skipping already seen {}", task.target_url());
                        duplicates_skipped += 1;
                        frontier.task_done();
                        continue;
                    }

                    let job = CrawlJob::new(
                        task,
                        self.fetcher.clone(),
                        frontier.clone(),
                        self.sink.clone(),
                    );

                    match pool.submit(job).await {
                        Ok(()) => {
                            dispatched += 1;
                            if dispatched % PROGRESS_INTERVAL == 0 {
                                tracing::info!(
                                    "Progress: {} dispatched, {} queued, {} seen",
                                    dispatched,
                                    frontier.len(),
                                    frontier.seen_count()
                                );
                            }
                        }
                        Err(PoolStopped(job)) => {
                            tracing::trace!("Pool stopped, discarding {}", job.task().target_url());
                            discarded += 1;
                            frontier.task_done();
                        }
                    }
                }
            }
        }

        drop(pool);

        let seeded = match seeding.await {
            Ok(seeded) => seeded,
            Err(e) => {
                tracing::warn!("Seeding task failed: {}", e);
                0
            }
        };

        let report = CrawlReport {
            sitemap_url: sitemap_url.clone(),
            started_at,
            elapsed: timer.elapsed(),
            seeded,
            dispatched,
            duplicates_skipped,
            discarded,
            stopped_early: !drained,
        };

        tracing::info!(
            "Crawl {}: {} pages dispatched, {} duplicates skipped in {:.2}s",
            if report.stopped_early { "stopped" } else { "complete" },
            report.dispatched,
            report.duplicates_skipped,
            report.elapsed.as_secs_f64()
        );

        Ok(report)
    }
}
