use super::audio_segment::AudioSegment;
use crate::lyrics::domain::transcript_segment::TranscriptSegment;

/// Domain interface for speech-to-text transcription.
///
/// Implementations return one segment per detected utterance, with start
/// times in seconds.
pub trait SpeechRecognizer: Send {
    fn transcribe(
        &self,
        audio: &AudioSegment,
        language: &str,
    ) -> Result<Vec<TranscriptSegment>, Box<dyn std::error::Error>>;
}
