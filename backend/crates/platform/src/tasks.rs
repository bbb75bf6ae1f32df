//! Background task queue
//!
//! Request handlers hand side effects (emails, view counters, exports) to a
//! [`TaskQueue`]. A single worker drains the queue and runs each job through a
//! [`JobHandler`]. Dispatch never blocks and never fails the request: when the
//! queue is full or closed the job is dropped with a warning, and handler
//! errors are logged and swallowed.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct JobError(String);

impl JobError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self(message.to_string())
    }
}

#[trait_variant::make(JobHandler: Send)]
pub trait LocalJobHandler<J> {
    async fn handle(&self, job: J) -> Result<(), JobError>;
}

pub struct TaskQueue<J> {
    name: &'static str,
    tx: mpsc::Sender<J>,
}

impl<J> Clone for TaskQueue<J> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
        }
    }
}

impl<J> fmt::Debug for TaskQueue<J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("name", &self.name)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<J> TaskQueue<J>
where
    J: fmt::Debug + Send + 'static,
{
    /// Start a worker on the current tokio runtime.
    pub fn spawn<H>(name: &'static str, capacity: usize, handler: H) -> Self
    where
        H: JobHandler<J> + Sync + 'static,
    {
        let (queue, mut rx) = Self::detached(name, capacity);
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let label = format!("{job:?}");
                match handler.handle(job).await {
                    Ok(()) => tracing::debug!(queue = name, job = %label, "Background job done"),
                    Err(e) => {
                        tracing::warn!(queue = name, job = %label, error = %e, "Background job failed")
                    }
                }
            }
            tracing::debug!(queue = name, "Task queue closed");
        });
        queue
    }

    /// Queue without a worker; the caller owns the receiving end.
    pub fn detached(name: &'static str, capacity: usize) -> (Self, mpsc::Receiver<J>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { name, tx }, rx)
    }

    /// Enqueue a job. Returns `false` when it was dropped.
    pub fn dispatch(&self, job: J) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                tracing::warn!(queue = self.name, job = ?job, "Task queue full, dropping job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                tracing::warn!(queue = self.name, job = ?job, "Task queue closed, dropping job");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug)]
    enum CounterJob {
        Add(usize),
        Fail,
    }

    struct Counter(Arc<AtomicUsize>);

    impl JobHandler<CounterJob> for Counter {
        async fn handle(&self, job: CounterJob) -> Result<(), JobError> {
            match job {
                CounterJob::Add(n) => {
                    self.0.fetch_add(n, Ordering::SeqCst);
                    Ok(())
                }
                CounterJob::Fail => Err(JobError::new("boom")),
            }
        }
    }

    #[tokio::test]
    async fn test_worker_survives_failures() {
        let total = Arc::new(AtomicUsize::new(0));
        let queue = TaskQueue::spawn("counter", 8, Counter(total.clone()));

        assert!(queue.dispatch(CounterJob::Add(2)));
        assert!(queue.dispatch(CounterJob::Fail));
        assert!(queue.dispatch(CounterJob::Add(3)));

        for _ in 0..50 {
            if total.load(Ordering::SeqCst) == 5 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(total.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_full_queue_drops() {
        let (queue, mut rx) = TaskQueue::detached("tiny", 1);
        assert!(queue.dispatch(CounterJob::Add(1)));
        assert!(!queue.dispatch(CounterJob::Add(2)));
        assert!(matches!(rx.recv().await, Some(CounterJob::Add(1))));

        drop(rx);
        assert!(!queue.dispatch(CounterJob::Add(3)));
    }
}
