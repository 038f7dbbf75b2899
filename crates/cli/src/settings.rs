use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use lyric_sync_core::shared::constants::{APP_DIR_NAME, DEFAULT_LANGUAGE, DEFAULT_WHISPER_MODEL};
use lyric_sync_core::sync::domain::sync_frame::HighlightMode;
use lyric_sync_core::sync::infrastructure::sync_worker::DEFAULT_POLL_INTERVAL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Spoken language passed to the recognizer.
    pub language: String,
    /// Whisper model size, e.g. `tiny.en`, `base`, `medium`.
    pub whisper_model: String,
    pub use_gpu: bool,
    pub poll_interval_ms: u64,
    pub highlight_mode: HighlightMode,
    /// Stop following once playback reaches the end of the track. Off by
    /// default: sync keeps polling until the user stops it.
    pub stop_at_end: bool,
    /// Hand the audio to the system player when playback starts.
    pub open_audio: bool,
    /// Lines shown above and below the active one; 0 shows every line.
    pub context_lines: usize,
    pub scratch_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            whisper_model: DEFAULT_WHISPER_MODEL.to_string(),
            use_gpu: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            highlight_mode: HighlightMode::default(),
            stop_at_end: false,
            open_audio: true,
            context_lines: 0,
            scratch_dir: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    /// Saved settings, or defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable settings at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = Self::config_path().ok_or("could not determine config directory")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
