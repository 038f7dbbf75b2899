use std::path::Path;

use super::audio_segment::AudioSegment;

/// Domain interface for reading an uploaded audio file.
pub trait AudioReader: Send {
    /// Track length in seconds, from container metadata.
    fn probe_duration(&self, path: &Path) -> Result<f64, Box<dyn std::error::Error>>;

    /// Decode to a mono PCM AudioSegment at the given sample rate.
    /// Returns None if the file has no audio stream.
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>>;
}
