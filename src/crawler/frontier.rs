//! Crawl frontier
//!
//! The frontier owns everything that is left to crawl:
//! - a seen-set of canonical URLs, tested and marked under one lock
//! - a bounded FIFO queue of [`CrawlTask`]s
//! - an outstanding counter (queued plus in-flight tasks) for drain detection
//! - a close token that releases every waiter

use crate::crawler::task::CrawlTask;
use crate::url::canonical_key;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Returned by [`Frontier::enqueue`] once the frontier has been closed
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("frontier is closed")]
pub struct FrontierClosed;

/// Deduplicating, bounded queue of crawl tasks
///
/// Every successful `enqueue` must eventually be balanced by one `task_done`,
/// either when the task is skipped or when its execution finishes. The frontier
/// is drained when that balance reaches zero.
pub struct Frontier {
    seen: Mutex<HashSet<String>>,
    sender: mpsc::Sender<CrawlTask>,
    receiver: AsyncMutex<mpsc::Receiver<CrawlTask>>,
    capacity: usize,
    outstanding: AtomicUsize,
    drained: Notify,
    closed: CancellationToken,
}

impl Frontier {
    /// Creates an open frontier holding at most `capacity` queued tasks
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);

        Self {
            seen: Mutex::new(HashSet::new()),
            sender,
            receiver: AsyncMutex::new(receiver),
            capacity,
            outstanding: AtomicUsize::new(0),
            drained: Notify::new(),
            closed: CancellationToken::new(),
        }
    }

    /// Enqueues one task per URL in a background task, with `origin` as parent
    ///
    /// The frontier counts as busy until seeding finishes, so it cannot be seen
    /// as drained while seeds are still waiting for queue space. The handle
    /// yields the number of tasks actually enqueued.
    pub fn seed(self: &Arc<Self>, urls: Vec<Url>, origin: Url) -> JoinHandle<usize> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);

        let frontier = Arc::clone(self);
        tokio::spawn(async move {
            let total = urls.len();
            let mut seeded = 0;

            for url in urls {
                if frontier
                    .enqueue(CrawlTask::new(origin.clone(), url))
                    .await
                    .is_err()
                {
                    tracing::debug!(
                        "Frontier closed after seeding {} of {} URLs",
                        seeded,
                        total
                    );
                    break;
                }
                seeded += 1;
            }

            frontier.task_done();
            seeded
        })
    }

    /// Adds a task to the back of the queue, waiting while the queue is full
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The task is queued
    /// * `Err(FrontierClosed)` - The frontier was closed; the task is discarded
    pub async fn enqueue(&self, task: CrawlTask) -> Result<(), FrontierClosed> {
        if self.closed.is_cancelled() {
            return Err(FrontierClosed);
        }

        self.outstanding.fetch_add(1, Ordering::SeqCst);

        let sent = tokio::select! {
            biased;
            _ = self.closed.cancelled() => false,
            result = self.sender.send(task) => result.is_ok(),
        };

        if sent {
            Ok(())
        } else {
            self.task_done();
            Err(FrontierClosed)
        }
    }

    /// Takes the task at the front of the queue
    ///
    /// Waits while the queue is empty. Once the frontier is closed, the remaining
    /// queued tasks are still handed out and `None` is returned when none are left.
    pub async fn next(&self) -> Option<CrawlTask> {
        let mut receiver = self.receiver.lock().await;

        if self.closed.is_cancelled() {
            return receiver.try_recv().ok();
        }

        tokio::select! {
            biased;
            task = receiver.recv() => task,
            _ = self.closed.cancelled() => receiver.try_recv().ok(),
        }
    }

    /// Marks `url` as seen
    ///
    /// Returns `true` if the URL was not seen before. Test and mark happen under
    /// one lock, so concurrent callers with the same URL get exactly one `true`.
    pub fn mark_seen(&self, url: &Url) -> bool {
        self.lock_seen().insert(canonical_key(url))
    }

    /// Balances one successful `enqueue`
    pub fn task_done(&self) {
        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        if previous == Ok(1) {
            self.drained.notify_waiters();
        }
    }

    /// Resolves once no task is queued and none is in flight
    pub async fn drained(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Closes the frontier, waking every waiter in `next` and `enqueue`
    ///
    /// Idempotent.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of queued tasks
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct URLs marked seen
    pub fn seen_count(&self) -> usize {
        self.lock_seen().len()
    }

    /// Number of tasks queued or in flight
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn lock_seen(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
