//! Shutdown coordination.

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::error::Result;
use crate::types::Status;

use super::MediaDownloader;

/// How long shutdown waits for stopped processes to be reaped
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between checks for items still downloading
const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

impl MediaDownloader {
    /// Gracefully shut down the downloader
    ///
    /// Stops accepting new runs, pauses every running download and drops
    /// queued batch jobs, then waits (bounded) until nothing is `InProgress`.
    /// Items whose jobs were dropped stay in their previous state.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` leaves room for cleanup steps that can fail.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new downloads");

        let paused = self.pause_all();
        tracing::info!(paused, "Signaled pause to all active downloads");

        // Jobs still waiting for a worker hold live runs too
        let remaining = self.cancel_remaining_runs();
        tracing::info!(remaining, "Cancelled remaining runs");

        if tokio::time::timeout(SHUTDOWN_TIMEOUT, self.wait_for_active_downloads())
            .await
            .is_err()
        {
            tracing::warn!("Timeout waiting for downloads to stop, proceeding with shutdown");
        } else {
            tracing::info!("All active downloads stopped");
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }

    fn cancel_remaining_runs(&self) -> usize {
        let mut cancelled = 0;
        for media in self.queue.snapshot() {
            if media.has_active_run() {
                media.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    async fn wait_for_active_downloads(&self) {
        while self
            .queue
            .snapshot()
            .iter()
            .any(|media| media.status() == Status::InProgress)
        {
            tokio::time::sleep(SETTLE_POLL_INTERVAL).await;
        }
    }
}
