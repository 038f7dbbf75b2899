use std::sync::OnceLock;

use regex::Regex;

use super::lyric_line::{LyricLine, LyricTrack};

/// A non-blank input line that did not match `[MM:SS.ss]text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the input.
    pub line_number: usize,
    pub content: String,
}

/// Result of best-effort parsing: every valid line plus what was dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedLyrics {
    pub track: LyricTrack,
    pub skipped: Vec<SkippedLine>,
}

impl ParsedLyrics {
    pub fn into_track(self) -> LyricTrack {
        self.track
    }
}

/// Parses canonical timed-lyrics text back into a [`LyricTrack`].
pub struct LrcParser;

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\[([0-9]{2}):([0-9]{2}\.[0-9]{2})\](.*)$").expect("valid lyric line pattern")
    })
}

impl LrcParser {
    /// Parse line by line, keeping input order.
    ///
    /// Lines split on `\n` (a trailing `\r` is dropped). Malformed lines are
    /// recorded in [`ParsedLyrics::skipped`] and never abort parsing; blank
    /// lines are ignored outright. Text after `]` is kept verbatim.
    pub fn parse(text: &str) -> ParsedLyrics {
        let mut lines = Vec::new();
        let mut skipped = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            match Self::parse_line(raw) {
                Some(line) => lines.push(line),
                None if raw.trim().is_empty() => {}
                None => {
                    log::debug!("Skipping malformed lyric line {}: {raw:?}", idx + 1);
                    skipped.push(SkippedLine {
                        line_number: idx + 1,
                        content: raw.to_string(),
                    });
                }
            }
        }

        ParsedLyrics {
            track: LyricTrack::new(lines),
            skipped,
        }
    }

    /// Parse a single `[MM:SS.ss]text` line.
    pub fn parse_line(line: &str) -> Option<LyricLine> {
        let caps = line_pattern().captures(line)?;
        let minutes: u32 = caps[1].parse().ok()?;
        let seconds: f64 = caps[2].parse().ok()?;
        Some(LyricLine::new(
            f64::from(minutes) * 60.0 + seconds,
            &caps[3],
        ))
    }
}
