use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::lyrics::domain::transcript_segment::TranscriptSegment;

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// Produces one segment per Whisper utterance. The model is loaded per call,
/// so a recognizer can be built cheaply and shared across a batch.
#[derive(Debug)]
pub struct WhisperRecognizer {
    model_path: PathBuf,
    use_gpu: bool,
}

impl WhisperRecognizer {
    pub fn new(model_path: &Path, use_gpu: bool) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        Ok(Self {
            model_path: model_path.to_path_buf(),
            use_gpu,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(
        &self,
        audio: &AudioSegment,
        language: &str,
    ) -> Result<Vec<TranscriptSegment>, Box<dyn std::error::Error>> {
        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(self.use_gpu);

        let ctx = WhisperContext::new_with_params(
            self.model_path.to_str().ok_or("Invalid model path")?,
            ctx_params,
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        let mut state = ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(language));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(8) as i32);

        state
            .full(params, audio.samples())
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut segments = Vec::new();
        for seg_idx in 0..state.full_n_segments() {
            let Some(segment) = state.get_segment(seg_idx) else {
                continue;
            };
            let text = match segment.to_str_lossy() {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("Skipping undecodable segment {seg_idx}: {e}");
                    continue;
                }
            };

            // Segment timestamps are in centiseconds (10ms units)
            let start = segment.start_timestamp().max(0) as f64 / 100.0;
            segments.push(TranscriptSegment::new(start, text.into_owned()));
        }

        log::info!(
            "Transcribed {:.1}s of audio into {} segments",
            audio.duration(),
            segments.len()
        );
        Ok(segments)
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_nonexistent_path_returns_error() {
        let result = WhisperRecognizer::new(Path::new("/nonexistent/model.bin"), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_nonexistent_path_error_message() {
        let result = WhisperRecognizer::new(Path::new("/nonexistent/model.bin"), false);
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("not found"),
            "Expected 'not found' in error, got: {err}"
        );
    }

    #[test]
    fn test_new_keeps_model_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let model = tmp.path().join("ggml-tiny.bin");
        std::fs::write(&model, b"not really a model").unwrap();
        let recognizer = WhisperRecognizer::new(&model, true).unwrap();
        assert_eq!(recognizer.model_path(), model.as_path());
    }

    #[test]
    #[ignore] // Requires whisper model file
    fn test_transcribe_does_not_crash_on_sine_wave() {
        let model_path = crate::shared::model_resolver::resolve_whisper("tiny.en", None, None)
            .expect("Failed to resolve whisper model");
        let recognizer = WhisperRecognizer::new(&model_path, false).unwrap();

        let sample_rate = crate::shared::constants::WHISPER_SAMPLE_RATE;
        let len = (3.0 * sample_rate as f64) as usize;
        let samples: Vec<f32> = (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * std::f64::consts::PI * 440.0 * t).sin() as f32
            })
            .collect();
        let audio = AudioSegment::new(samples, sample_rate, 1);

        let result = recognizer.transcribe(&audio, "en");
        assert!(result.is_ok(), "Transcription should not error: {result:?}");
    }
}
