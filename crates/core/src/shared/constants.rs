/// Directory name used under the platform config/cache/temp directories.
pub const APP_DIR_NAME: &str = "LyricSync";

pub const WHISPER_MODEL_BASE_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";
pub const DEFAULT_WHISPER_MODEL: &str = "medium";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Upload types accepted by the importer, lowercase.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav"];

/// Overrides the scratch directory uploads are copied into.
pub const SCRATCH_DIR_ENV: &str = "LYRIC_SYNC_SCRATCH_DIR";
pub const DEFAULT_SCRATCH_DIR_NAME: &str = "lyric_sync_uploads";
