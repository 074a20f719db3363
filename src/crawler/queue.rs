//! Bounded-concurrency FIFO job queue
//!
//! The queue runs at most `concurrency` jobs at a time; submissions beyond
//! that wait for a slot in FIFO order. Accepted jobs flow through an ordered
//! channel into a single dispatcher task that acquires a semaphore permit
//! before spawning each one, so slots are handed out strictly in submission
//! order even on a multi-threaded runtime. A cumulative acceptance cap
//! rejects further submissions synchronously, and a per-job timeout converts
//! a stuck job into a terminal [`CrawlError::Timeout`].
//!
//! Exactly one outcome reaches the callback, exactly once: a timed-out job's
//! future is dropped, so a completion that would have arrived later cannot
//! fire the callback a second time.

use crate::CrawlError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// Terminal outcome of one submitted job
#[derive(Debug)]
pub struct JobOutcome<T> {
    /// The URL the job was submitted for
    pub url: String,

    /// The job's result, or the error that ended it
    pub result: Result<T, CrawlError>,
}

type QueuedJob = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Bounded-concurrency executor with a cumulative acceptance cap
pub struct JobQueue {
    jobs_tx: mpsc::UnboundedSender<QueuedJob>,
    timeout: Option<Duration>,
    limit: Option<u64>,
    accepted: u64,
}

impl JobQueue {
    /// Creates a queue running at most `concurrency` jobs at a time
    ///
    /// # Arguments
    ///
    /// * `concurrency` - Maximum number of jobs running concurrently
    /// * `timeout` - Per-job timeout; `None` disables it
    /// * `limit` - Cumulative cap on accepted submissions; `None` is unbounded
    pub fn new(concurrency: usize, timeout: Option<Duration>, limit: Option<u64>) -> Self {
        let (jobs_tx, mut jobs_rx) = mpsc::unbounded_channel::<QueuedJob>();
        let semaphore = Arc::new(Semaphore::new(concurrency));

        // One dispatcher awaits permits in channel order, so slots are
        // granted strictly in submission order. The channel closes when the
        // queue is dropped, ending the dispatcher once drained.
        tokio::spawn(async move {
            while let Some(job) = jobs_rx.recv().await {
                // The queue never closes the semaphore, so acquisition can
                // only fail if the whole runtime is shutting down.
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    return;
                };
                tokio::spawn(async move {
                    let _permit = permit;
                    job.await;
                });
            }
        });

        Self {
            jobs_tx,
            timeout,
            limit,
            accepted: 0,
        }
    }

    /// Submits a job, returning whether it was accepted
    ///
    /// Returns `false` synchronously once the cumulative cap has been
    /// reached; the callback is never invoked for a rejected submission.
    /// An accepted job starts immediately if a slot is free, otherwise it
    /// waits its turn in submission order. When a slot frees up (normal
    /// completion or timeout), the next waiting job starts at once.
    pub fn submit<T, F, C>(&mut self, url: String, job: F, callback: C) -> bool
    where
        T: Send + 'static,
        F: Future<Output = Result<T, CrawlError>> + Send + 'static,
        C: FnOnce(JobOutcome<T>) + Send + 'static,
    {
        if let Some(limit) = self.limit {
            if self.accepted >= limit {
                tracing::debug!("Job limit {} reached, rejecting {}", limit, url);
                return false;
            }
        }
        self.accepted += 1;

        let timeout = self.timeout;
        let queued: QueuedJob = Box::pin(async move {
            // The timeout clock starts when the job gets its slot, not at
            // submission.
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, job).await {
                    Ok(result) => result,
                    Err(_) => Err(CrawlError::Timeout { url: url.clone() }),
                },
                None => job.await,
            };

            callback(JobOutcome { url, result });
        });

        // The dispatcher outlives the queue, so this only fails on runtime
        // shutdown, when no outcome can be delivered anyway.
        let _ = self.jobs_tx.send(queued);
        true
    }

    /// Number of submissions accepted so far
    pub fn accepted(&self) -> u64 {
        self.accepted
    }
}
