//! Download lifecycle control — bulk and single start, bulk and single pause.

use crate::error::{DownloadError, Error, Result};
use crate::types::{MediaId, Status};

use super::MediaDownloader;
use super::pool::{self, MediaJob};
use super::task::run_media_task;

impl MediaDownloader {
    /// Start every startable item in the queue
    ///
    /// Items that are `Pending`, `Failed` or `Paused` are selected from a
    /// snapshot of the queue, each given a new run, and dispatched in queue
    /// order to a fresh pool of [`parallel_downloads`](Self::parallel_downloads)
    /// workers. Items added afterwards wait for the next call.
    ///
    /// After [`shutdown`](Self::shutdown) nothing is selected and an empty
    /// batch is returned.
    ///
    /// Every call creates an independent pool. Calling this again while a
    /// batch is still running, or starting single items with
    /// [`start_one`](Self::start_one), can run more processes than the
    /// configured limit.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use media_dl::{AddOptions, Config, MediaDownloader};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let downloader = MediaDownloader::new(Config::default()).await?;
    /// downloader.add("https://example.com/a", AddOptions::default()).await;
    /// downloader.add("https://example.com/b", AddOptions::default()).await;
    ///
    /// let batch = downloader.start_all().await;
    /// batch.join().await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start_all(&self) -> pool::BatchHandle {
        let workers = self.parallel_downloads();
        if !self.is_accepting_new() {
            tracing::warn!("Shutdown in progress, not starting downloads");
            return pool::spawn_batch(Vec::new(), workers, self.task_env()).await;
        }
        let jobs: Vec<MediaJob> = self
            .queue
            .snapshot()
            .into_iter()
            .filter(|media| media.status().is_startable())
            .map(|media| {
                let run = media.begin_run(Some(self.run_observer()));
                MediaJob { media, run }
            })
            .collect();

        tracing::info!(selected = jobs.len(), workers, "Starting downloads");
        pool::spawn_batch(jobs, workers, self.task_env()).await
    }

    /// Start a single item outside the worker pool
    ///
    /// The returned handle resolves to the task's outcome:
    /// [`Error::Cancelled`](crate::Error::Cancelled) when the item was paused,
    /// the process error when it failed.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`](crate::Error::NotFound) for an unknown id
    /// - [`DownloadError::InvalidState`] when the item is `InProgress` or `Completed`
    /// - [`Error::ShuttingDown`](crate::Error::ShuttingDown) after [`shutdown`](Self::shutdown)
    pub fn start_one(&self, id: &MediaId) -> Result<tokio::task::JoinHandle<Result<()>>> {
        if !self.is_accepting_new() {
            return Err(Error::ShuttingDown);
        }
        let media = self.queue.get(id)?;
        let status = media.status();
        if !status.is_startable() {
            return Err(DownloadError::InvalidState {
                id: id.clone(),
                operation: "start".to_string(),
                current_state: status,
            }
            .into());
        }

        let run = media.begin_run(Some(self.run_observer()));
        let ctx = self.task_env().context(MediaJob { media, run });
        tracing::info!(media_id = %id, "Starting single download");
        Ok(tokio::spawn(run_media_task(ctx)))
    }

    /// Pause every item that is currently downloading
    ///
    /// Returns how many items were signalled. Each one ends up `Paused` once
    /// its process has been stopped.
    pub fn pause_all(&self) -> usize {
        let mut paused = 0;
        for media in self.queue.snapshot() {
            if media.status() == Status::InProgress {
                media.cancel();
                paused += 1;
            }
        }
        tracing::info!(paused, "Paused all downloads");
        paused
    }

    /// Pause one item if it is currently downloading
    ///
    /// Returns whether the item was signalled; items in any other state are
    /// left alone.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) for an unknown id.
    pub fn pause_one(&self, id: &MediaId) -> Result<bool> {
        let media = self.queue.get(id)?;
        if media.status() != Status::InProgress {
            tracing::debug!(media_id = %id, status = ?media.status(), "Not running, nothing to pause");
            return Ok(false);
        }
        media.cancel();
        tracing::info!(media_id = %id, "Pause requested");
        Ok(true)
    }
}
