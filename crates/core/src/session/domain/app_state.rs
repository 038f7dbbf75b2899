use std::time::Instant;

use thiserror::Error;

use super::playlist::Playlist;
use super::song::Song;
use crate::sync::domain::playback_state::PlaybackState;
use crate::sync::domain::playback_sync::{PlaybackSync, SyncError};
use crate::sync::domain::sync_frame::{HighlightMode, SyncFrame};

#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("no song named '{0}' in the playlist")]
    UnknownSong(String),
    #[error("song #{index} does not exist (playlist has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no song selected")]
    NothingSelected,
    #[error("playback has not started")]
    NotPlaying,
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Where the user is with respect to the selected song.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Session {
    Idle,
    Selected { index: usize },
    Syncing { index: usize, playback: PlaybackState },
}

/// All mutable application state, changed only through its methods.
#[derive(Debug)]
pub struct AppState {
    playlist: Playlist,
    session: Session,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            playlist: Playlist::new(),
            session: Session::Idle,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn session(&self) -> Session {
        self.session
    }

    /// Append a song; `false` if the name is already taken.
    pub fn add_song(&mut self, song: Song) -> bool {
        self.playlist.add(song)
    }

    /// Select a song by playlist index. Any running sync is discarded.
    pub fn select(&mut self, index: usize) -> Result<&Song, SessionError> {
        let len = self.playlist.len();
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        self.session = Session::Selected { index };
        self.playlist
            .get(index)
            .ok_or(SessionError::IndexOutOfRange { index, len })
    }

    pub fn select_by_name(&mut self, name: &str) -> Result<&Song, SessionError> {
        let index = self
            .playlist
            .position(name)
            .ok_or_else(|| SessionError::UnknownSong(name.to_string()))?;
        self.select(index)
    }

    pub fn selected_song(&self) -> Option<&Song> {
        match self.session {
            Session::Idle => None,
            Session::Selected { index } | Session::Syncing { index, .. } => {
                self.playlist.get(index)
            }
        }
    }

    /// Begin (or restart) playback of the selected song at `now`.
    pub fn start(&mut self, now: Instant) -> Result<PlaybackState, SessionError> {
        let index = match self.session {
            Session::Idle => return Err(SessionError::NothingSelected),
            Session::Selected { index } | Session::Syncing { index, .. } => index,
        };
        let song = self.playlist.get(index).ok_or(SessionError::NothingSelected)?;
        let playback = PlaybackState::new(now, song.duration_seconds())?;
        self.session = Session::Syncing { index, playback };
        Ok(playback)
    }

    /// Leave `Syncing`, keeping the selection.
    pub fn reset(&mut self) {
        if let Session::Syncing { index, .. } = self.session {
            self.session = Session::Selected { index };
        }
    }

    /// Frame for the selected song at `now`.
    pub fn frame(&self, now: Instant, mode: HighlightMode) -> Result<SyncFrame, SessionError> {
        let (index, playback) = match self.session {
            Session::Syncing { index, playback } => (index, playback),
            _ => return Err(SessionError::NotPlaying),
        };
        let song = self.playlist.get(index).ok_or(SessionError::NothingSelected)?;
        Ok(PlaybackSync::frame(
            song.track(),
            playback.elapsed_at(now),
            playback.duration_seconds(),
            mode,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state_with(names: &[&str]) -> AppState {
        let mut state = AppState::new();
        for name in names {
            let song = Song::new(
                *name,
                format!("/tmp/{name}"),
                120.0,
                "[00:00.00]a\n[00:10.00]b\n[00:20.00]c",
            )
            .unwrap();
            state.add_song(song);
        }
        state
    }

    #[test]
    fn test_starts_idle() {
        let state = AppState::new();
        assert_eq!(state.session(), Session::Idle);
        assert!(state.selected_song().is_none());
    }

    #[test]
    fn test_select_moves_to_selected() {
        let mut state = state_with(&["a.mp3", "b.mp3"]);
        let song = state.select(1).unwrap();
        assert_eq!(song.name(), "b.mp3");
        assert_eq!(state.session(), Session::Selected { index: 1 });
    }

    #[test]
    fn test_select_out_of_range() {
        let mut state = state_with(&["a.mp3"]);
        assert_eq!(
            state.select(3).unwrap_err(),
            SessionError::IndexOutOfRange { index: 3, len: 1 }
        );
        assert_eq!(state.session(), Session::Idle);
    }

    #[test]
    fn test_select_by_unknown_name() {
        let mut state = state_with(&["a.mp3"]);
        assert_eq!(
            state.select_by_name("zzz.wav").unwrap_err(),
            SessionError::UnknownSong("zzz.wav".to_string())
        );
    }

    #[test]
    fn test_start_requires_selection() {
        let mut state = state_with(&["a.mp3"]);
        assert_eq!(
            state.start(Instant::now()).unwrap_err(),
            SessionError::NothingSelected
        );
    }

    #[test]
    fn test_full_cycle_produces_frames() {
        let mut state = state_with(&["a.mp3"]);
        state.select_by_name("a.mp3").unwrap();
        assert_eq!(
            state.frame(Instant::now(), HighlightMode::Position).unwrap_err(),
            SessionError::NotPlaying
        );

        let t0 = Instant::now();
        state.start(t0).unwrap();
        let frame = state
            .frame(t0 + Duration::from_secs(15), HighlightMode::Position)
            .unwrap();
        assert_eq!(frame.active_line, "b");
        assert_eq!(frame.elapsed_label, "00:15 / 02:00");
    }

    #[test]
    fn test_reselect_discards_sync() {
        let mut state = state_with(&["a.mp3", "b.mp3"]);
        state.select(0).unwrap();
        state.start(Instant::now()).unwrap();
        state.select(1).unwrap();
        assert_eq!(state.session(), Session::Selected { index: 1 });
    }

    #[test]
    fn test_restart_replaces_start_time() {
        let mut state = state_with(&["a.mp3"]);
        state.select(0).unwrap();
        let t0 = Instant::now();
        state.start(t0).unwrap();
        let t1 = t0 + Duration::from_secs(30);
        let playback = state.start(t1).unwrap();
        assert_eq!(playback.started_at(), t1);
        let frame = state.frame(t1, HighlightMode::Position).unwrap();
        assert_eq!(frame.active_line, "a");
    }

    #[test]
    fn test_reset_keeps_selection() {
        let mut state = state_with(&["a.mp3"]);
        state.select(0).unwrap();
        state.start(Instant::now()).unwrap();
        state.reset();
        assert_eq!(state.session(), Session::Selected { index: 0 });
        state.reset();
        assert_eq!(state.session(), Session::Selected { index: 0 });
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let mut state = state_with(&["a.mp3"]);
        let dup = Song::new("a.mp3", "/elsewhere/a.mp3", 10.0, "").unwrap();
        assert!(!state.add_song(dup));
        assert_eq!(state.playlist().len(), 1);
        assert_eq!(
            state.playlist().get(0).unwrap().audio_path(),
            std::path::Path::new("/tmp/a.mp3")
        );
    }
}
