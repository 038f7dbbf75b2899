use std::path::Path;

/// Hand the audio file to the platform's default player.
///
/// Failure is logged, not fatal: lyrics still sync without sound.
pub fn open_audio(path: &Path) {
    match open::that_detached(path) {
        Ok(()) => log::info!("Opened {} in the system player", path.display()),
        Err(e) => log::warn!("Could not open {}: {e}", path.display()),
    }
}
