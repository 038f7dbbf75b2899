//! Timed-lyrics engine: turns transcribed audio into `[MM:SS.ss]text` lyrics
//! and follows playback to find the line being sung.

pub mod audio;
pub mod lyrics;
pub mod pipeline;
pub mod session;
pub mod shared;
pub mod sync;
