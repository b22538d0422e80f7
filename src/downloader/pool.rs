//! Bounded worker pool for bulk starts
//!
//! Each bulk start gets its own pool: a job channel holding the selected items
//! in queue order, N worker loops pulling from it, and N semaphore permits.
//! Pools from separate calls (and single-item starts) share nothing, so
//! overlapping calls can run more than N processes at once.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio::task::JoinHandle;

use super::task::{MediaTaskContext, run_media_task};
use crate::command::CommandProvider;
use crate::media::{MediaRecord, RunHandle};
use crate::types::MediaId;

/// One selected item and the run handle created for it
pub(crate) struct MediaJob {
    pub(crate) media: Arc<MediaRecord>,
    pub(crate) run: Arc<RunHandle>,
}

/// Shared inputs for every task in a pool
#[derive(Clone)]
pub(crate) struct TaskEnv {
    pub(crate) commands: Arc<dyn CommandProvider>,
    pub(crate) drain_timeout: Duration,
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl TaskEnv {
    pub(crate) fn context(&self, job: MediaJob) -> MediaTaskContext {
        MediaTaskContext {
            media: job.media,
            run: job.run,
            commands: self.commands.clone(),
            drain_timeout: self.drain_timeout,
            accepting_new: self.accepting_new.clone(),
        }
    }
}

/// Handle to the workers of one bulk start
///
/// Dropping the handle does not stop the batch.
#[derive(Debug)]
pub struct BatchHandle {
    selected: Vec<MediaId>,
    workers: Vec<JoinHandle<()>>,
}

impl BatchHandle {
    /// Ids selected for this batch, in dispatch order
    pub fn selected(&self) -> &[MediaId] {
        &self.selected
    }

    /// Number of items selected for this batch
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing was startable
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Number of worker loops started
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Wait until every worker has drained the job channel
    pub async fn join(self) {
        for result in futures::future::join_all(self.workers).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Download worker panicked");
            }
        }
    }
}

/// Dispatch jobs in order to `workers` worker loops
pub(crate) async fn spawn_batch(jobs: Vec<MediaJob>, workers: usize, env: TaskEnv) -> BatchHandle {
    let selected: Vec<MediaId> = jobs.iter().map(|job| job.media.id().clone()).collect();

    if jobs.is_empty() {
        return BatchHandle {
            selected,
            workers: Vec::new(),
        };
    }
    if workers == 0 {
        tracing::warn!(
            selected = selected.len(),
            "parallel_downloads is 0, no downloads will run"
        );
        return BatchHandle {
            selected,
            workers: Vec::new(),
        };
    }

    let (tx, rx) = mpsc::channel(jobs.len());
    for job in jobs {
        // Capacity equals the job count and the receiver is alive, so this never waits
        if tx.send(job).await.is_err() {
            break;
        }
    }
    drop(tx);

    let rx = Arc::new(Mutex::new(rx));
    let permits = Arc::new(Semaphore::new(workers.min(Semaphore::MAX_PERMITS)));

    let handles: Vec<JoinHandle<()>> = (0..workers)
        .map(|worker| {
            let rx = rx.clone();
            let permits = permits.clone();
            let env = env.clone();
            tokio::spawn(async move {
                loop {
                    let job = rx.lock().await.recv().await;
                    let Some(job) = job else {
                        break;
                    };

                    let permit = match permits.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => break,
                    };

                    let id = job.media.id().clone();
                    tracing::debug!(worker, media_id = %id, "Worker picked up media");
                    if let Err(e) = run_media_task(env.context(job)).await {
                        if !e.is_cancelled() {
                            tracing::debug!(worker, media_id = %id, error = %e, "Media task ended with error");
                        }
                    }
                    drop(permit);
                }
                tracing::debug!(worker, "Worker finished");
            })
        })
        .collect();

    BatchHandle {
        selected,
        workers: handles,
    }
}
