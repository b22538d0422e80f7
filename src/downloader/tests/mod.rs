//! Tests for the downloader, driven by `/bin/sh` scripts standing in for yt-dlp.

use super::test_helpers::*;
use super::*;
use crate::types::{AddOptions, MediaId, Status};
use std::time::Duration;

mod queue;
