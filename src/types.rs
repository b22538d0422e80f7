//! Core types for media-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ValidationError;

/// Unique identifier for a media item
///
/// Identifiers are opaque strings. Items created through
/// [`MediaDownloader::add`](crate::MediaDownloader::add) receive a random UUID;
/// an empty identifier is never admitted to the queue.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    /// Create a MediaId from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random (v4 UUID) identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (not admissible to the queue)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MediaId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for MediaId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MediaId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Download status
///
/// Transitions: `Pending → InProgress → {Completed | Failed | Paused}` and
/// `Failed | Paused → InProgress` when restarted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Queued and never started
    #[default]
    Pending,
    /// yt-dlp is running for this item
    InProgress,
    /// Finished successfully
    Completed,
    /// yt-dlp failed or could not be started
    Failed,
    /// Cancelled by the user; can be restarted
    Paused,
}

impl Status {
    /// Whether a start call may (re)start an item in this state
    pub fn is_startable(self) -> bool {
        matches!(self, Status::Pending | Status::Failed | Status::Paused)
    }

    /// Whether the item has reached the end of a run
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Failed | Status::Paused)
    }
}

/// Video quality ceiling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoQuality {
    /// No height bound, best available
    #[default]
    #[serde(rename = "unspecified")]
    Unspecified,
    /// At most 360 lines
    #[serde(rename = "360p")]
    Q360p,
    /// At most 480 lines
    #[serde(rename = "480p")]
    Q480p,
    /// At most 720 lines
    #[serde(rename = "720p")]
    Q720p,
    /// At most 1080 lines
    #[serde(rename = "1080p")]
    Q1080p,
    /// At most 1440 lines
    #[serde(rename = "1440p")]
    Q1440p,
    /// At most 2160 lines
    #[serde(rename = "2160p")]
    Q2160p,
}

impl VideoQuality {
    /// All height-bounded levels, lowest first
    pub const LEVELS: [VideoQuality; 6] = [
        VideoQuality::Q360p,
        VideoQuality::Q480p,
        VideoQuality::Q720p,
        VideoQuality::Q1080p,
        VideoQuality::Q1440p,
        VideoQuality::Q2160p,
    ];

    /// Maximum video height in lines, `None` for [`VideoQuality::Unspecified`]
    pub fn max_height(self) -> Option<u32> {
        match self {
            VideoQuality::Unspecified => None,
            VideoQuality::Q360p => Some(360),
            VideoQuality::Q480p => Some(480),
            VideoQuality::Q720p => Some(720),
            VideoQuality::Q1080p => Some(1080),
            VideoQuality::Q1440p => Some(1440),
            VideoQuality::Q2160p => Some(2160),
        }
    }
}

impl std::fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max_height() {
            Some(h) => write!(f, "{h}p"),
            None => f.write_str("unspecified"),
        }
    }
}

impl std::str::FromStr for VideoQuality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        if label == "unspecified" || label == "best" {
            return Ok(VideoQuality::Unspecified);
        }
        VideoQuality::LEVELS
            .into_iter()
            .find(|q| q.to_string() == label)
            .ok_or_else(|| ValidationError::UnknownQuality(s.to_string()))
    }
}

/// Kind of playlist selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    /// Every entry of the playlist
    #[default]
    All,
    /// A contiguous range of entries
    Range,
    /// An explicit list of entries
    Items,
}

/// Which entries of a playlist to download (1-based indices)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSelection {
    /// Selection kind
    pub kind: SelectionKind,
    /// First entry for [`SelectionKind::Range`]
    #[serde(default)]
    pub start: i64,
    /// Last entry (inclusive) for [`SelectionKind::Range`]
    #[serde(default)]
    pub end: i64,
    /// Entries for [`SelectionKind::Items`]
    #[serde(default)]
    pub items: Vec<i64>,
}

impl PlaylistSelection {
    /// Select every entry
    pub fn all() -> Self {
        Self::default()
    }

    /// Select entries `start..=end`
    pub fn range(start: i64, end: i64) -> Self {
        Self {
            kind: SelectionKind::Range,
            start,
            end,
            items: Vec::new(),
        }
    }

    /// Select an explicit list of entries
    pub fn items(items: Vec<i64>) -> Self {
        Self {
            kind: SelectionKind::Items,
            start: 0,
            end: 0,
            items,
        }
    }

    /// Check that the selection is usable
    ///
    /// `All` is always valid. A range needs `start >= 1` and `end >= start`;
    /// an item list must be non-empty with every index `>= 1`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.kind {
            SelectionKind::All => Ok(()),
            SelectionKind::Range => {
                if self.start < 1 {
                    return Err(ValidationError::RangeStart(self.start));
                }
                if self.end < self.start {
                    return Err(ValidationError::RangeOrder {
                        start: self.start,
                        end: self.end,
                    });
                }
                Ok(())
            }
            SelectionKind::Items => {
                if self.items.is_empty() {
                    return Err(ValidationError::EmptyItems);
                }
                match self.items.iter().find(|&&i| i < 1) {
                    Some(&bad) => Err(ValidationError::ItemIndex(bad)),
                    None => Ok(()),
                }
            }
        }
    }

    /// The `--playlist-items` value, or `None` when no restriction applies
    ///
    /// Invalid selections degrade to `None` rather than failing.
    pub fn to_items_arg(&self) -> Option<String> {
        self.validate().ok()?;
        match self.kind {
            SelectionKind::All => None,
            SelectionKind::Range => Some(format!("{}-{}", self.start, self.end)),
            SelectionKind::Items => Some(
                self.items
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }
}

/// Live progress of a media item
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Percentage complete, 0 to 100 (derived, may move backwards on restart)
    pub percentage: u8,
    /// Bytes downloaded so far
    pub downloaded_bytes: u64,
    /// Total bytes, 0 when unknown
    pub total_bytes: u64,
    /// Every non-blank output line, in arrival order
    pub logs: Vec<String>,
}

/// Options for a new queue entry; unset fields fall back to the media defaults
#[derive(Clone, Debug, Default)]
pub struct AddOptions {
    /// Quality ceiling
    pub quality: Option<VideoQuality>,
    /// Destination directory
    pub download_dir: Option<PathBuf>,
    /// Download audio only
    pub audio_only: Option<bool>,
    /// Playlist entries to fetch
    pub playlist: PlaylistSelection,
}

/// Event emitted during the media download lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Media added to queue
    Queued {
        /// Media ID
        id: MediaId,
        /// Source URL
        url: String,
    },

    /// Media removed from queue
    Removed {
        /// Media ID
        id: MediaId,
    },

    /// Progress or log update
    Progress {
        /// Media ID
        id: MediaId,
        /// Current title
        title: String,
        /// Percentage complete
        percentage: u8,
        /// Bytes downloaded so far
        downloaded_bytes: u64,
        /// Total bytes, 0 when unknown
        total_bytes: u64,
        /// Output lines so far
        logs: Vec<String>,
    },

    /// Status changed
    StatusChanged {
        /// Media ID
        id: MediaId,
        /// New status
        status: Status,
    },

    /// Title reported by yt-dlp
    TitleChanged {
        /// Media ID
        id: MediaId,
        /// New title
        title: String,
    },
}

impl Event {
    /// The media item this event refers to
    pub fn media_id(&self) -> &MediaId {
        match self {
            Event::Queued { id, .. }
            | Event::Removed { id }
            | Event::Progress { id, .. }
            | Event::StatusChanged { id, .. }
            | Event::TitleChanged { id, .. } => id,
        }
    }
}
