use std::path::{Path, PathBuf};

use crate::lyrics::domain::lrc_parser::LrcParser;
use crate::lyrics::domain::lyric_line::LyricTrack;
use crate::sync::domain::playback_sync::SyncError;

/// A processed upload: audio location, duration and its timed lyrics.
///
/// Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    name: String,
    audio_path: PathBuf,
    duration_seconds: f64,
    lyrics_text: String,
    track: LyricTrack,
}

impl Song {
    /// Build from canonical lyric text. Malformed lines are dropped.
    pub fn new(
        name: impl Into<String>,
        audio_path: impl Into<PathBuf>,
        duration_seconds: f64,
        lyrics_text: impl Into<String>,
    ) -> Result<Self, SyncError> {
        if !(duration_seconds > 0.0) {
            return Err(SyncError::NonPositiveDuration(duration_seconds));
        }
        let name = name.into();
        let lyrics_text = lyrics_text.into();
        let parsed = LrcParser::parse(&lyrics_text);
        if !parsed.skipped.is_empty() {
            log::warn!(
                "{name}: dropped {} malformed lyric line(s)",
                parsed.skipped.len()
            );
        }
        if !parsed.track.is_ascending() {
            log::warn!("{name}: lyric offsets are not ascending, sync may stall");
        }

        Ok(Self {
            name,
            audio_path: audio_path.into(),
            duration_seconds,
            lyrics_text,
            track: parsed.into_track(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Canonical `[MM:SS.ss]text` lines.
    pub fn lyrics_text(&self) -> &str {
        &self.lyrics_text
    }

    pub fn track(&self) -> &LyricTrack {
        &self.track
    }
}
