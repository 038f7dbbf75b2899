pub mod clock;
pub mod playback_state;
pub mod playback_sync;
pub mod sync_frame;
