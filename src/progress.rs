//! Parser for yt-dlp progress-template output
//!
//! yt-dlp is started with a `--progress-template` that prints one line per
//! progress update:
//!
//! ```text
//! [media-dl] <title> [downloaded] <n|NA> [total] <n|NA> [frag] <n|NA> [frags] <n|NA>
//! ```
//!
//! Lines that do not match are ordinary yt-dlp output: they are still logged
//! but never used for progress.

use crate::error::ParseError;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Literal used by yt-dlp for fields it cannot determine
pub const NOT_AVAILABLE: &str = "NA";

// The pattern is a compile-time constant; failure here is a programming error.
#[allow(clippy::expect_used)]
static PROGRESS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[media-dl\]\s+(.+?)\s+\[downloaded\]\s+([0-9]+|NA)\s+\[total\]\s+([0-9]+|NA)\s+\[frag\]\s+([0-9]+|NA)\s+\[frags\]\s+([0-9]+|NA)$",
    )
    .expect("progress line pattern is valid")
});

/// One parsed progress line
///
/// Numeric fields are kept verbatim (digits or `NA`); use the accessor methods
/// for numeric values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressLine {
    /// Media title, trimmed
    pub title: String,
    /// Downloaded bytes
    pub downloaded_bytes: String,
    /// Total bytes
    pub total_bytes: String,
    /// Current fragment index
    pub fragment_index: String,
    /// Total fragment count
    pub fragment_count: String,
}

impl ProgressLine {
    /// Downloaded bytes, `None` for `NA`
    pub fn downloaded(&self) -> Option<u64> {
        numeric(&self.downloaded_bytes)
    }

    /// Total bytes, `None` for `NA`
    pub fn total(&self) -> Option<u64> {
        numeric(&self.total_bytes)
    }

    /// Fragment index and count, only when both are numeric
    pub fn fragments(&self) -> Option<(u64, u64)> {
        Some((numeric(&self.fragment_index)?, numeric(&self.fragment_count)?))
    }

    /// The parsed fields as a five-key map
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("title", self.title.clone()),
            ("downloaded_bytes", self.downloaded_bytes.clone()),
            ("total_bytes", self.total_bytes.clone()),
            ("fragment_index", self.fragment_index.clone()),
            ("fragment_count", self.fragment_count.clone()),
        ])
    }
}

fn numeric(field: &str) -> Option<u64> {
    if field == NOT_AVAILABLE {
        return None;
    }
    field.parse().ok()
}

/// Parse one line of yt-dlp output
///
/// # Errors
///
/// Returns [`ParseError::FormatMismatch`] when a marker is missing or out of
/// order, a numeric field is neither digits nor exactly `NA`, or anything
/// follows the fragment count.
pub fn parse_progress_line(line: &str) -> Result<ProgressLine, ParseError> {
    let caps = PROGRESS_LINE
        .captures(line.trim())
        .ok_or(ParseError::FormatMismatch)?;

    let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();

    Ok(ProgressLine {
        title: field(1).trim().to_string(),
        downloaded_bytes: field(2),
        total_bytes: field(3),
        fragment_index: field(4),
        fragment_count: field(5),
    })
}

/// Byte and percentage values derived from one progress line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Downloaded bytes (`NA` counts as 0)
    pub downloaded_bytes: u64,
    /// Total bytes (`NA` counts as 0)
    pub total_bytes: u64,
    /// Percentage complete
    pub percentage: u8,
}

/// Derive byte counts and a percentage from a parsed line
///
/// The percentage is byte-based when the total is known. For fragmented
/// (HLS/DASH) downloads without a total it falls back to
/// `fragment_index / fragment_count`. When neither is available the
/// `previous` percentage is kept.
pub fn compute_progress(line: &ProgressLine, previous: u8) -> ProgressUpdate {
    let downloaded_bytes = line.downloaded().unwrap_or(0);
    let total_bytes = line.total().unwrap_or(0);

    let percentage = if total_bytes > 0 {
        ratio_percent(downloaded_bytes, total_bytes)
    } else {
        match line.fragments() {
            Some((index, count)) if count > 0 => ratio_percent(index, count),
            _ => previous,
        }
    };

    ProgressUpdate {
        downloaded_bytes,
        total_bytes,
        percentage,
    }
}

fn ratio_percent(part: u64, whole: u64) -> u8 {
    let pct = (u128::from(part) * 100) / u128::from(whole);
    pct.min(100) as u8
}
