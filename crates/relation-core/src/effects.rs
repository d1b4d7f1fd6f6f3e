//! Side-effect queue for best-effort work.
//!
//! Spreadsheet mirroring, facet re-sync and quiz persistence must never
//! block or fail the request that triggered them. They are submitted here
//! and drained in order by a single worker task.
//!
//! Contract:
//! - `submit` never waits; a full queue drops the job with a warning.
//! - A failing job is logged and forgotten.
//! - Jobs run one at a time in submission order.

use crate::error::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

enum Job {
    Run {
        label: &'static str,
        task: BoxFuture<'static, Result<()>>,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle for submitting fire-and-forget jobs.
#[derive(Clone)]
pub struct SideEffectQueue {
    tx: mpsc::Sender<Job>,
}

impl SideEffectQueue {
    /// Start a queue with the given capacity and its worker task.
    pub fn spawn(capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Job>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    Job::Run { label, task } => match task.await {
                        Ok(()) => debug!(job = label, "Side effect done"),
                        Err(e) => warn!(job = label, error = %e, "Side effect failed"),
                    },
                    Job::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("Side-effect queue closed");
        });
        (Self { tx }, worker)
    }

    /// Queue a job. Returns `false` if it was dropped.
    pub fn submit<F>(&self, label: &'static str, task: F) -> bool
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let job = Job::Run {
            label,
            task: task.boxed(),
        };
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(job = label, "Side-effect queue full, dropping job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(job = label, "Side-effect queue closed, dropping job");
                false
            }
        }
    }

    /// Wait until every job submitted before this call has finished.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Flush(done_tx)).await.is_ok() {
            let _ = done_rx.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_jobs_run_in_order() {
        let (queue, _worker) = SideEffectQueue::spawn(8);
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        for i in 0..5 {
            let log = Arc::clone(&log);
            assert!(queue.submit("push", async move {
                log.lock().unwrap().push(i);
                Ok(())
            }));
        }
        queue.flush().await;
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_worker() {
        let (queue, _worker) = SideEffectQueue::spawn(8);
        let count = Arc::new(AtomicUsize::new(0));
        queue.submit("fail", async { Err(Error::Internal("boom".into())) });
        let c = Arc::clone(&count);
        queue.submit("ok", async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        queue.flush().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (queue, _worker) = SideEffectQueue::spawn(1);
        let (gate_tx, gate_rx) = oneshot::channel::<()>();
        // First job parks the worker.
        queue.submit("gate", async move {
            let _ = gate_rx.await;
            Ok(())
        });
        tokio::task::yield_now().await;

        let mut accepted = 0;
        for _ in 0..4 {
            if queue.submit("extra", async { Ok(()) }) {
                accepted += 1;
            }
        }
        assert!(accepted < 4);
        let _ = gate_tx.send(());
        queue.flush().await;
    }
}
