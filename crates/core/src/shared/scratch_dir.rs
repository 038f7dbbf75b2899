use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::constants::{DEFAULT_SCRATCH_DIR_NAME, SCRATCH_DIR_ENV};

/// Where uploaded audio is copied before probing and transcription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$LYRIC_SYNC_SCRATCH_DIR`, then `fallback`, then `<tmp>/lyric_sync_uploads`.
    pub fn resolve(fallback: Option<&Path>) -> Self {
        Self::resolve_with(std::env::var_os(SCRATCH_DIR_ENV).map(PathBuf::from), fallback)
    }

    fn resolve_with(from_env: Option<PathBuf>, fallback: Option<&Path>) -> Self {
        let root = from_env
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| fallback.map(Path::to_path_buf))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_SCRATCH_DIR_NAME));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy `source` into the scratch directory under `name`, overwriting
    /// any previous copy.
    pub fn store(&self, source: &Path, name: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let dest = self.root.join(name);
        if dest != source {
            fs::copy(source, &dest)?;
        }
        Ok(dest)
    }
}
