//! Fixed-size worker pool
//!
//! Workers are tokio tasks pulling [`Work`] items off one shared bounded queue.
//! Shutdown is cooperative: once the stop token fires, a worker finishes the
//! item it is executing and exits without taking another. A supervisor task joins
//! every worker and then resolves the pool's [`PoolCompletion`].

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Identity of the worker executing a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerContext {
    /// Zero-based index of the worker
    pub worker_id: usize,

    /// Number of workers in the pool
    pub pool_size: usize,
}

/// A unit of work executed by one pool worker
#[async_trait]
pub trait Work: Send + 'static {
    /// Runs the work to completion on the worker described by `ctx`
    async fn execute(self: Box<Self>, ctx: WorkerContext);
}

/// Returned by [`WorkerPool::submit`] once the pool is stopping
///
/// Hands the rejected work back to the caller.
pub struct PoolStopped<W>(pub W);

impl<W> PoolStopped<W> {
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W> fmt::Debug for PoolStopped<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PoolStopped(..)")
    }
}

impl<W> fmt::Display for PoolStopped<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("worker pool is stopped")
    }
}

impl<W> std::error::Error for PoolStopped<W> {}

/// Resolves once every worker of a pool has exited
///
/// Resolves exactly once; do not poll it again after it has completed.
#[derive(Debug)]
pub struct PoolCompletion {
    receiver: oneshot::Receiver<()>,
}

impl Future for PoolCompletion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        // A dropped sender means the supervisor is gone, which also means done
        Pin::new(&mut self.receiver).poll(cx).map(|_| ())
    }
}

/// Handle for submitting work to a running pool
pub struct WorkerPool<W: Work> {
    sender: mpsc::Sender<W>,
    stop: CancellationToken,
    size: usize,
}

impl<W: Work> WorkerPool<W> {
    /// Spawns `worker_count` workers sharing a queue of `queue_capacity` items
    ///
    /// Cancelling `stop` shuts the pool down. Dropping the returned pool also
    /// lets the workers exit once the queue is empty.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        worker_count: usize,
        queue_capacity: usize,
        stop: CancellationToken,
    ) -> (Self, PoolCompletion) {
        let size = worker_count.max(1);
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let queue = Arc::new(AsyncMutex::new(receiver));

        let workers: Vec<JoinHandle<()>> = (0..size)
            .map(|worker_id| {
                let ctx = WorkerContext {
                    worker_id,
                    pool_size: size,
                };
                tokio::spawn(run_worker(ctx, queue.clone(), stop.clone()))
            })
            .collect();

        let (done, receiver) = oneshot::channel();
        tokio::spawn(async move {
            for (worker_id, handle) in workers.into_iter().enumerate() {
                if let Err(e) = handle.await {
                    tracing::warn!("Worker {} exited abnormally: {}", worker_id, e);
                }
            }
            tracing::debug!("All {} workers stopped", size);
            let _ = done.send(());
        });

        tracing::debug!("Started worker pool with {} workers", size);

        (Self { sender, stop, size }, PoolCompletion { receiver })
    }

    /// Queues `work` for the next free worker, waiting while the queue is full
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The work is queued
    /// * `Err(PoolStopped)` - The stop token fired first; the work is handed back
    pub async fn submit(&self, work: W) -> Result<(), PoolStopped<W>> {
        if self.stop.is_cancelled() {
            return Err(PoolStopped(work));
        }

        let permit = tokio::select! {
            biased;
            _ = self.stop.cancelled() => None,
            permit = self.sender.reserve() => permit.ok(),
        };

        match permit {
            Some(permit) => {
                permit.send(work);
                Ok(())
            }
            None => Err(PoolStopped(work)),
        }
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.size
    }
}

async fn run_worker<W: Work>(
    ctx: WorkerContext,
    queue: Arc<AsyncMutex<mpsc::Receiver<W>>>,
    stop: CancellationToken,
) {
    loop {
        let work = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            work = next_work(&queue) => match work {
                Some(work) => work,
                None => break,
            },
        };

        if stop.is_cancelled() {
            break;
        }

        Box::new(work).execute(ctx).await;
    }

    tracing::trace!("Worker {} stopped", ctx.worker_id);
}

async fn next_work<W>(queue: &AsyncMutex<mpsc::Receiver<W>>) -> Option<W> {
    queue.lock().await.recv().await
}
