use thiserror::Error;

use super::sync_frame::{HighlightMode, HighlightedLine, SyncFrame};
use crate::lyrics::domain::lyric_line::LyricTrack;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SyncError {
    #[error("track duration must be positive, got {0}")]
    NonPositiveDuration(f64),
}

/// Pure synchronization rules: which line is active and how far along
/// playback is, given elapsed seconds.
///
/// Holds no clock state; callers recompute elapsed time on every poll.
pub struct PlaybackSync;

impl PlaybackSync {
    /// Index of the last line whose offset is `<= elapsed`.
    ///
    /// Scans in track order and stops at the first line past `elapsed`, so
    /// the result is only meaningful for offset-ascending tracks.
    pub fn active_index(track: &LyricTrack, elapsed: f64) -> Option<usize> {
        let mut active = None;
        for (i, line) in track.iter().enumerate() {
            if elapsed >= line.offset {
                active = Some(i);
            } else {
                break;
            }
        }
        active
    }

    /// Text of the active line, or `""` before the first line.
    pub fn active_line(track: &LyricTrack, elapsed: f64) -> &str {
        Self::active_index(track, elapsed)
            .map(|i| track.lines()[i].text.as_str())
            .unwrap_or("")
    }

    /// `min(elapsed / duration, 1.0)`, floored at 0.
    pub fn progress(elapsed: f64, duration: f64) -> Result<f64, SyncError> {
        if !(duration > 0.0) {
            return Err(SyncError::NonPositiveDuration(duration));
        }
        Ok((elapsed / duration).max(0.0).min(1.0))
    }

    /// `MM:SS / MM:SS` for elapsed and total time.
    pub fn elapsed_label(elapsed: f64, duration: f64) -> String {
        format!("{} / {}", clock_label(elapsed), clock_label(duration))
    }

    pub fn frame(
        track: &LyricTrack,
        elapsed: f64,
        duration: f64,
        mode: HighlightMode,
    ) -> Result<SyncFrame, SyncError> {
        let progress = Self::progress(elapsed, duration)?;
        let active_index = Self::active_index(track, elapsed);
        let active_line = active_index
            .map(|i| track.lines()[i].text.clone())
            .unwrap_or_default();

        let lines = track
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let highlighted = match (mode, active_index) {
                    (_, None) => false,
                    (HighlightMode::Position, Some(active)) => i == active,
                    (HighlightMode::Text, Some(_)) => line.text == active_line,
                };
                HighlightedLine {
                    text: line.text.clone(),
                    highlighted,
                }
            })
            .collect();

        Ok(SyncFrame {
            progress,
            elapsed_label: Self::elapsed_label(elapsed, duration),
            active_line,
            active_index,
            lines,
        })
    }
}

/// `MM:SS` with whole seconds; negative and NaN show as `00:00`.
pub fn clock_label(seconds: f64) -> String {
    let seconds = if seconds > 0.0 { seconds } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes:02}:{secs:02}")
}
