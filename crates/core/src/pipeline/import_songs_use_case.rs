use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::import_logger::{ImportLogger, ImportStage};
use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::lyrics::domain::lrc_formatter::LrcFormatter;
use crate::lyrics::domain::transcript_segment::TranscriptSegment;
use crate::session::domain::app_state::AppState;
use crate::session::domain::song::Song;
use crate::shared::constants::{AUDIO_EXTENSIONS, WHISPER_SAMPLE_RATE};
use crate::shared::scratch_dir::ScratchDir;
use crate::sync::domain::playback_sync::SyncError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("unsupported audio format '{0}' (expected mp3 or wav)")]
    UnsupportedFormat(String),
    #[error("path has no usable file name: {0}")]
    InvalidName(PathBuf),
    #[error("failed to save upload: {0}")]
    Scratch(#[source] io::Error),
    #[error("could not read audio metadata: {0}")]
    Probe(String),
    #[error("could not decode audio: {0}")]
    Decode(String),
    #[error("file contains no audio stream")]
    NoAudio,
    #[error("transcription failed: {0}")]
    Transcription(String),
    #[error(transparent)]
    Duration(#[from] SyncError),
}

#[derive(Debug)]
pub struct ImportFailure {
    pub name: String,
    pub error: ImportError,
}

/// Outcome of one batch, in input order within each list.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub duplicates: Vec<String>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Turns uploaded audio files into playlist songs.
///
/// Per file: save to scratch, probe duration, decode and transcribe,
/// format the segments as canonical lyrics, and append to the playlist.
/// Files run one at a time; a failure is recorded and the batch continues.
pub struct ImportSongsUseCase {
    reader: Box<dyn AudioReader>,
    recognizer: Box<dyn SpeechRecognizer>,
    scratch: ScratchDir,
    language: String,
    logger: Box<dyn ImportLogger>,
}

impl ImportSongsUseCase {
    pub fn new(
        reader: Box<dyn AudioReader>,
        recognizer: Box<dyn SpeechRecognizer>,
        scratch: ScratchDir,
        language: impl Into<String>,
        logger: Box<dyn ImportLogger>,
    ) -> Self {
        Self {
            reader,
            recognizer,
            scratch,
            language: language.into(),
            logger,
        }
    }

    pub fn execute(&mut self, paths: &[PathBuf], state: &mut AppState) -> ImportReport {
        let mut report = ImportReport::default();
        let mut seen = HashSet::new();

        for path in paths {
            let name = match file_name(path) {
                Ok(name) => name,
                Err(error) => {
                    let name = path.display().to_string();
                    self.logger.failed(&name, &error.to_string());
                    report.failures.push(ImportFailure { name, error });
                    continue;
                }
            };

            if state.playlist().contains(&name) || !seen.insert(name.clone()) {
                self.logger.duplicate(&name);
                report.duplicates.push(name);
                continue;
            }

            match self.process(path, &name) {
                Ok(song) => {
                    self.logger.completed(&name, song.track().len());
                    state.add_song(song);
                    report.imported.push(name);
                }
                Err(error) => {
                    self.logger.failed(&name, &error.to_string());
                    report.failures.push(ImportFailure { name, error });
                }
            }
        }

        self.logger.summary();
        report
    }

    /// Run the full pipeline for one file without touching any playlist.
    pub fn process(&mut self, path: &Path, name: &str) -> Result<Song, ImportError> {
        check_extension(path)?;

        self.logger.stage(name, ImportStage::Saving);
        let stored = self
            .scratch
            .store(path, name)
            .map_err(ImportError::Scratch)?;

        self.logger.stage(name, ImportStage::Probing);
        let duration = self
            .reader
            .probe_duration(&stored)
            .map_err(|e| ImportError::Probe(e.to_string()))?;
        if !(duration > 0.0) {
            return Err(SyncError::NonPositiveDuration(duration).into());
        }

        self.logger.stage(name, ImportStage::Transcribing);
        let audio = self
            .reader
            .read_audio(&stored, WHISPER_SAMPLE_RATE)
            .map_err(|e| ImportError::Decode(e.to_string()))?
            .ok_or(ImportError::NoAudio)?;
        let mut segments = self
            .recognizer
            .transcribe(&audio, &self.language)
            .map_err(|e| ImportError::Transcription(e.to_string()))?;

        self.logger.stage(name, ImportStage::Formatting);
        TranscriptSegment::sort_by_start(&mut segments);
        let lyrics = LrcFormatter::format(&segments);

        Ok(Song::new(name, stored, duration, lyrics)?)
    }
}

fn file_name(path: &Path) -> Result<String, ImportError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ImportError::InvalidName(path.to_path_buf()))
}

fn check_extension(path: &Path) -> Result<(), ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(ImportError::UnsupportedFormat(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::audio_segment::AudioSegment;
    use crate::pipeline::import_logger::NullImportLogger;
    use rstest::rstest;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    // ─── Stubs ───

    struct StubAudioReader {
        duration: f64,
        has_audio: bool,
        decode_fails: bool,
    }

    impl AudioReader for StubAudioReader {
        fn probe_duration(&self, _: &Path) -> Result<f64, Box<dyn std::error::Error>> {
            Ok(self.duration)
        }

        fn read_audio(
            &self,
            _: &Path,
            rate: u32,
        ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
            if self.decode_fails {
                return Err("invalid data found when processing input".into());
            }
            Ok(self
                .has_audio
                .then(|| AudioSegment::new(vec![0.0; rate as usize], rate, 1)))
        }
    }

    /// Returns fixed segments (or a fixed error) and records each call.
    struct StubRecognizer {
        segments: Vec<TranscriptSegment>,
        fail: bool,
        calls: Arc<Mutex<usize>>,
        languages: Arc<Mutex<Vec<String>>>,
    }

    impl SpeechRecognizer for StubRecognizer {
        fn transcribe(
            &self,
            _: &AudioSegment,
            language: &str,
        ) -> Result<Vec<TranscriptSegment>, Box<dyn std::error::Error>> {
            *self.calls.lock().unwrap() += 1;
            self.languages.lock().unwrap().push(language.to_string());
            if self.fail {
                return Err("CUDA out of memory".into());
            }
            Ok(self.segments.clone())
        }
    }

    struct Fixture {
        _tmp: TempDir,
        upload_dir: PathBuf,
        scratch_dir: PathBuf,
        calls: Arc<Mutex<usize>>,
        languages: Arc<Mutex<Vec<String>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let upload_dir = tmp.path().join("uploads");
            fs::create_dir_all(&upload_dir).unwrap();
            let scratch_dir = tmp.path().join("scratch");
            Self {
                _tmp: tmp,
                upload_dir,
                scratch_dir,
                calls: Arc::new(Mutex::new(0)),
                languages: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn upload(&self, name: &str) -> PathBuf {
            let path = self.upload_dir.join(name);
            fs::write(&path, b"audio bytes").unwrap();
            path
        }

        fn use_case(&self, duration: f64, fail: bool) -> ImportSongsUseCase {
            ImportSongsUseCase::new(
                Box::new(StubAudioReader {
                    duration,
                    has_audio: true,
                    decode_fails: false,
                }),
                Box::new(StubRecognizer {
                    segments: vec![
                        TranscriptSegment::new(65.5, "world"),
                        TranscriptSegment::new(0.0, " Hello "),
                    ],
                    fail,
                    calls: self.calls.clone(),
                    languages: self.languages.clone(),
                }),
                ScratchDir::new(&self.scratch_dir),
                "en",
                Box::new(NullImportLogger),
            )
        }
    }

    #[test]
    fn test_import_builds_song() {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let report = fx
            .use_case(180.0, false)
            .execute(&[fx.upload("song.mp3")], &mut state);

        assert_eq!(report.imported, vec!["song.mp3"]);
        assert!(report.is_clean());

        let song = state.playlist().get(0).unwrap();
        assert_eq!(song.lyrics_text(), "[00:00.00]Hello\n[01:05.50]world");
        assert_eq!(song.audio_path(), fx.scratch_dir.join("song.mp3"));
        assert!(song.audio_path().exists());
        assert_eq!(song.duration_seconds(), 180.0);
        assert_eq!(*fx.languages.lock().unwrap(), vec!["en"]);
    }

    #[test]
    fn test_reupload_is_skipped_without_transcribing() {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let mut uc = fx.use_case(180.0, false);
        uc.execute(&[fx.upload("song.mp3")], &mut state);
        let report = uc.execute(&[fx.upload("song.mp3")], &mut state);

        assert!(report.imported.is_empty());
        assert_eq!(report.duplicates, vec!["song.mp3"]);
        assert_eq!(state.playlist().len(), 1);
        assert_eq!(*fx.calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_within_batch_processed_once() {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let path = fx.upload("twice.wav");
        let report = fx
            .use_case(60.0, false)
            .execute(&[path.clone(), path], &mut state);

        assert_eq!(report.imported, vec!["twice.wav"]);
        assert_eq!(report.duplicates, vec!["twice.wav"]);
        assert_eq!(*fx.calls.lock().unwrap(), 1);
    }

    #[rstest]
    #[case::flac("song.flac")]
    #[case::no_extension("song")]
    #[case::text("lyrics.txt")]
    fn test_unsupported_format(#[case] name: &str) {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let report = fx
            .use_case(60.0, false)
            .execute(&[fx.upload(name)], &mut state);

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            ImportError::UnsupportedFormat(_)
        ));
        assert_eq!(*fx.calls.lock().unwrap(), 0);
        assert!(state.playlist().is_empty());
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let report = fx
            .use_case(60.0, false)
            .execute(&[fx.upload("LOUD.MP3")], &mut state);
        assert_eq!(report.imported, vec!["LOUD.MP3"]);
    }

    #[test]
    fn test_transcription_failure_does_not_stop_batch() {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let report = fx.use_case(60.0, true).execute(
            &[fx.upload("a.mp3"), fx.upload("b.wav")],
            &mut state,
        );

        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].name, "a.mp3");
        assert_eq!(report.failures[1].name, "b.wav");
        assert!(report.failures[0]
            .error
            .to_string()
            .contains("CUDA out of memory"));
        assert_eq!(*fx.calls.lock().unwrap(), 2);
        assert!(state.playlist().is_empty());
    }

    #[test]
    fn test_failed_file_is_retried_next_batch() {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let path = fx.upload("a.mp3");
        fx.use_case(60.0, true).execute(&[path.clone()], &mut state);
        let report = fx.use_case(60.0, false).execute(&[path], &mut state);
        assert_eq!(report.imported, vec!["a.mp3"]);
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-3.0)]
    #[case::nan(f64::NAN)]
    fn test_bad_duration_is_rejected_before_transcribing(#[case] duration: f64) {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let report = fx
            .use_case(duration, false)
            .execute(&[fx.upload("silent.wav")], &mut state);
        assert!(matches!(
            report.failures[0].error,
            ImportError::Duration(SyncError::NonPositiveDuration(_))
        ));
        assert_eq!(*fx.calls.lock().unwrap(), 0);
        assert!(state.playlist().is_empty());
    }

    #[test]
    fn test_decode_failure_is_reported_as_decode() {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let mut uc = ImportSongsUseCase::new(
            Box::new(StubAudioReader {
                duration: 10.0,
                has_audio: true,
                decode_fails: true,
            }),
            Box::new(StubRecognizer {
                segments: vec![],
                fail: false,
                calls: fx.calls.clone(),
                languages: fx.languages.clone(),
            }),
            ScratchDir::new(&fx.scratch_dir),
            "en",
            Box::new(NullImportLogger),
        );
        let report = uc.execute(&[fx.upload("broken.mp3")], &mut state);
        assert!(matches!(report.failures[0].error, ImportError::Decode(_)));
        assert!(report.failures[0]
            .error
            .to_string()
            .starts_with("could not decode audio"));
        assert_eq!(*fx.calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_missing_file_reports_scratch_error() {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let report = fx
            .use_case(60.0, false)
            .execute(&[fx.upload_dir.join("ghost.mp3")], &mut state);
        assert!(matches!(report.failures[0].error, ImportError::Scratch(_)));
    }

    #[test]
    fn test_no_audio_stream() {
        let fx = Fixture::new();
        let mut state = AppState::new();
        let mut uc = ImportSongsUseCase::new(
            Box::new(StubAudioReader {
                duration: 10.0,
                has_audio: false,
                decode_fails: false,
            }),
            Box::new(StubRecognizer {
                segments: vec![],
                fail: false,
                calls: fx.calls.clone(),
                languages: fx.languages.clone(),
            }),
            ScratchDir::new(&fx.scratch_dir),
            "en",
            Box::new(NullImportLogger),
        );
        let report = uc.execute(&[fx.upload("empty.wav")], &mut state);
        assert!(matches!(report.failures[0].error, ImportError::NoAudio));
    }
}
