//! Runtime configuration updates — parallelism and media defaults.

use std::sync::atomic::Ordering;

use crate::config::MediaDefaults;

use super::MediaDownloader;

impl MediaDownloader {
    /// Worker count used by the next bulk start
    pub fn parallel_downloads(&self) -> usize {
        self.runtime_config.parallel_downloads.load(Ordering::SeqCst)
    }

    /// Change the worker count for future bulk starts
    ///
    /// Batches already running keep their size. Zero is accepted and means a
    /// bulk start runs nothing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use media_dl::{Config, MediaDownloader};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let downloader = MediaDownloader::new(Config::default()).await?;
    /// downloader.set_parallel_downloads(4);
    /// let batch = downloader.start_all().await;
    /// assert!(batch.worker_count() <= 4);
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_parallel_downloads(&self, parallel: usize) {
        self.runtime_config
            .parallel_downloads
            .store(parallel, Ordering::SeqCst);
        tracing::info!(parallel_downloads = parallel, "Parallel downloads changed");
    }

    /// Defaults currently applied by [`add`](Self::add)
    pub async fn media_defaults(&self) -> MediaDefaults {
        self.runtime_config.media_defaults.read().await.clone()
    }

    /// Replace the defaults applied to newly added items
    ///
    /// Items already queued keep their settings.
    pub async fn update_media_defaults(&self, defaults: MediaDefaults) {
        tracing::info!(
            quality = %defaults.quality,
            download_dir = %defaults.download_dir.display(),
            audio_only = defaults.audio_only,
            "Media defaults changed"
        );
        *self.runtime_config.media_defaults.write().await = defaults;
    }
}
