use super::transcript_segment::TranscriptSegment;

/// Renders transcript segments as canonical `[MM:SS.ss]text` lines.
pub struct LrcFormatter;

impl LrcFormatter {
    /// One line per segment, newline-joined, in the order given.
    ///
    /// Segment text is trimmed; empty text still produces a line.
    pub fn format(segments: &[TranscriptSegment]) -> String {
        segments
            .iter()
            .map(|s| format!("[{}]{}", Self::timestamp(s.start), s.text.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `MM:SS.ss` for a start time in seconds.
    ///
    /// Minutes are zero-padded to two digits and grow past them for long
    /// tracks. Seconds are rounded to centiseconds, so a remainder of 59.996
    /// renders as `60.00`. Negative or NaN starts render as `00:00.00`.
    pub fn timestamp(start: f64) -> String {
        let start = if start >= 0.0 {
            start
        } else {
            log::warn!("Clamping invalid segment start {start} to 0");
            0.0
        };
        let minutes = (start / 60.0).floor();
        let seconds = start - minutes * 60.0;
        format!("{:02}:{:05.2}", minutes as u64, seconds)
    }
}
