//! Crawl tasks
//!
//! A [`CrawlTask`] names one URL to fetch and where it was found. A [`CrawlJob`]
//! binds a task to the services it needs and is what the worker pool executes.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract_links;
use crate::crawler::pool::{Work, WorkerContext};
use crate::output::{StatsSink, WorkResult};
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// One URL to fetch, with the page it was discovered on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    parent_url: Url,
    target_url: Url,
}

impl CrawlTask {
    /// Creates a task for `target_url` discovered on `parent_url`
    pub fn new(parent_url: Url, target_url: Url) -> Self {
        Self {
            parent_url,
            target_url,
        }
    }

    /// Page (or sitemap) the target was discovered on
    pub fn parent_url(&self) -> &Url {
        &self.parent_url
    }

    /// URL to fetch
    pub fn target_url(&self) -> &Url {
        &self.target_url
    }
}

/// A crawl task ready to run on a worker
///
/// Executing the job fetches the target, feeds same-host links back into the
/// frontier, reports the result and finally marks the task done in the frontier.
pub struct CrawlJob {
    task: CrawlTask,
    fetcher: Arc<dyn Fetcher>,
    frontier: Arc<Frontier>,
    sink: Arc<dyn StatsSink>,
}

impl CrawlJob {
    pub fn new(
        task: CrawlTask,
        fetcher: Arc<dyn Fetcher>,
        frontier: Arc<Frontier>,
        sink: Arc<dyn StatsSink>,
    ) -> Self {
        Self {
            task,
            fetcher,
            frontier,
            sink,
        }
    }

    /// The task this job executes
    pub fn task(&self) -> &CrawlTask {
        &self.task
    }

    async fn crawl(&self, ctx: WorkerContext) {
        let target = self.task.target_url();

        let page = match self.fetcher.fetch(target).await {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!("[worker {}] {}", ctx.worker_id, e);
                return;
            }
        };

        if page.is_html {
            let links = extract_links(target, &page.body_text());
            tracing::trace!("Found {} links on {}", links.len(), target);

            for link in links {
                let discovered = CrawlTask::new(target.clone(), link);
                if self.frontier.enqueue(discovered).await.is_err() {
                    tracing::trace!("Frontier closed, dropping remaining links from {}", target);
                    break;
                }
            }
        }

        self.sink.record(WorkResult {
            parent_url: self.task.parent_url().clone(),
            url: target.clone(),
            worker_id: ctx.worker_id,
            pool_size: ctx.pool_size,
            response_size: page.size,
            status_code: page.status_code,
            start_time: page.start_time,
            end_time: page.end_time,
            content_type: page.content_type,
        });
    }
}

#[async_trait]
impl Work for CrawlJob {
    async fn execute(self: Box<Self>, ctx: WorkerContext) {
        self.crawl(ctx).await;
        self.frontier.task_done();
    }
}
