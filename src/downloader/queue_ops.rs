//! Adding, removing and inspecting queued media.

use std::sync::Arc;

use crate::error::Result;
use crate::media::{MediaRecord, MediaSnapshot, NewMedia};
use crate::types::{AddOptions, Event, MediaId};

use super::MediaDownloader;

impl MediaDownloader {
    /// Queue a URL for download
    ///
    /// The item gets a fresh random id, the placeholder title and status
    /// `Pending`. Options left unset fall back to the current media defaults.
    /// An invalid playlist selection is kept but will not restrict the
    /// download.
    ///
    /// Emits [`Event::Queued`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use media_dl::{AddOptions, Config, MediaDownloader, VideoQuality};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let downloader = MediaDownloader::new(Config::default()).await?;
    /// let id = downloader
    ///     .add(
    ///         "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
    ///         AddOptions {
    ///             quality: Some(VideoQuality::Q720p),
    ///             ..Default::default()
    ///         },
    ///     )
    ///     .await;
    /// println!("queued {id}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn add(&self, url: &str, options: AddOptions) -> MediaId {
        let defaults = self.media_defaults().await;
        let url = url.trim().to_string();

        if let Err(e) = options.playlist.validate() {
            tracing::warn!(url = %url, error = %e, "Ignoring invalid playlist selection");
        }

        let id = MediaId::generate();
        let record = Arc::new(MediaRecord::new(NewMedia {
            id: id.clone(),
            url: url.clone(),
            download_dir: options.download_dir.unwrap_or(defaults.download_dir),
            quality: options.quality.unwrap_or(defaults.quality),
            audio_only: options.audio_only.unwrap_or(defaults.audio_only),
            playlist: options.playlist,
        }));
        self.queue.add(record);

        tracing::info!(media_id = %id, url = %url, "Media queued");
        self.emit_event(Event::Queued {
            id: id.clone(),
            url,
        });
        id
    }

    /// Remove an item from the queue, stopping it first if it is running
    ///
    /// Emits [`Event::Removed`].
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no item has this id; the
    /// queue is left unchanged.
    pub fn remove(&self, id: &MediaId) -> Result<()> {
        let record = self.queue.remove(id)?;
        record.cancel();

        tracing::info!(media_id = %id, "Media removed");
        self.emit_event(Event::Removed { id: id.clone() });
        Ok(())
    }

    /// Snapshot of every queued item, in queue order
    pub fn queue(&self) -> Vec<MediaSnapshot> {
        self.queue.snapshot().iter().map(|m| m.snapshot()).collect()
    }

    /// Snapshot of a single item
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no item has this id.
    pub fn get(&self, id: &MediaId) -> Result<MediaSnapshot> {
        Ok(self.queue.get(id)?.snapshot())
    }

    /// The live shared record for an item
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no item has this id.
    pub fn media(&self, id: &MediaId) -> Result<Arc<MediaRecord>> {
        self.queue.get(id)
    }
}
