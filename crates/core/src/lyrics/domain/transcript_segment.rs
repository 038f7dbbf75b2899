/// One timestamped utterance produced by a speech recognizer.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptSegment {
    /// Seconds from the start of the audio.
    pub start: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            text: text.into(),
        }
    }

    /// Stable sort by start time. Segments with equal starts keep their
    /// recognizer order.
    pub fn sort_by_start(segments: &mut [TranscriptSegment]) {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    }
}
