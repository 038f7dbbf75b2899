use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::{APP_DIR_NAME, WHISPER_MODEL_BASE_URL};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create model directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// ggml file name for a Whisper model size, e.g. `medium` -> `ggml-medium.bin`.
pub fn whisper_model_file(model: &str) -> String {
    format!("ggml-{model}.bin")
}

pub fn whisper_model_url(model: &str) -> String {
    format!("{WHISPER_MODEL_BASE_URL}/{}", whisper_model_file(model))
}

/// Resolve a Whisper model by size, downloading it on first use.
pub fn resolve_whisper(
    model: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    resolve(
        &whisper_model_file(model),
        &whisper_model_url(model),
        bundled_dir,
        progress,
    )
}

/// Resolve a model file by name, checking cache locations before downloading.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled path (for development / pre-packaged installs)
/// 3. Download from URL to cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    resolve_in(&model_cache_dir()?, name, url, bundled_dir, progress)
}

fn resolve_in(
    cache_dir: &Path,
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        log::debug!("Using cached model {}", cached_path.display());
        return Ok(cached_path);
    }

    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            log::debug!("Using bundled model {}", bundled_path.display());
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {name} from {url}");
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/LyricSync/models/`
/// - Linux: `$XDG_CACHE_HOME/LyricSync/models/` or `~/.cache/LyricSync/models/`
/// - Windows: `%LOCALAPPDATA%/LyricSync/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join(APP_DIR_NAME).join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let download_err = |source| ModelResolveError::Download {
        url: url.to_string(),
        source,
    };

    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;
    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(download_err)?;

    // Written to a .part file first so a failed download never looks cached.
    let temp_path = dest.with_extension("part");
    let write_err = |source| ModelResolveError::Write {
        path: temp_path.clone(),
        source,
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;

    let mut downloaded: u64 = 0;
    for chunk in bytes.chunks(1024 * 1024) {
        file.write_all(chunk).map_err(write_err)?;
        downloaded += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UNREACHABLE: &str = "http://invalid.nonexistent.example.com/model.bin";

    #[test]
    fn test_whisper_model_naming() {
        assert_eq!(whisper_model_file("medium"), "ggml-medium.bin");
        assert!(whisper_model_url("tiny.en").ends_with("/ggml-tiny.en.bin"));
    }

    #[test]
    fn test_resolve_prefers_cache() {
        let tmp = TempDir::new().unwrap();
        let cached = tmp.path().join("ggml-tiny.bin");
        fs::write(&cached, b"cached").unwrap();

        let path = resolve_in(tmp.path(), "ggml-tiny.bin", UNREACHABLE, None, None).unwrap();
        assert_eq!(path, cached);
    }

    #[test]
    fn test_resolve_falls_back_to_bundled() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let bundled_dir = tmp.path().join("bundled");
        fs::create_dir_all(&bundled_dir).unwrap();
        fs::write(bundled_dir.join("ggml-tiny.bin"), b"bundled").unwrap();

        let path = resolve_in(
            &cache_dir,
            "ggml-tiny.bin",
            UNREACHABLE,
            Some(&bundled_dir),
            None,
        )
        .unwrap();
        assert_eq!(path, bundled_dir.join("ggml-tiny.bin"));
        assert!(!cache_dir.exists());
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains(APP_DIR_NAME));
        assert!(path.ends_with("models"));
    }

    #[test]
    #[ignore] // Requires network access
    fn test_download_to_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("robots.txt");

        let progress_called = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = progress_called.clone();

        let result = download(
            "https://www.google.com/robots.txt",
            &dest,
            Some(Box::new(move |_downloaded, _total| {
                flag.store(true, std::sync::atomic::Ordering::Relaxed);
            })),
        );
        assert!(result.is_ok(), "download failed: {:?}", result.err());
        assert!(!fs::read(&dest).unwrap().is_empty());
        assert!(progress_called.load(std::sync::atomic::Ordering::Relaxed));
    }

    #[test]
    fn test_failed_download_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let result = resolve_in(&cache_dir, "ggml-x.bin", UNREACHABLE, None, None);
        assert!(matches!(result, Err(ModelResolveError::Download { .. })));
        assert!(!cache_dir.join("ggml-x.bin").exists());
        assert!(!cache_dir.join("ggml-x.part").exists());
    }
}
