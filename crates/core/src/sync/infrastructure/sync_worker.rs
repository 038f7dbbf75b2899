use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender};

use crate::lyrics::domain::lyric_line::LyricTrack;
use crate::sync::domain::clock::Clock;
use crate::sync::domain::playback_state::PlaybackState;
use crate::sync::domain::playback_sync::PlaybackSync;
use crate::sync::domain::sync_frame::{HighlightMode, SyncFrame};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Messages sent from the sync thread to the render host.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncMessage {
    Frame(SyncFrame),
    /// Playback reached the end of the track (only with `stop_at_end`).
    Finished,
    Cancelled,
    Error(String),
}

/// Parameters for one sync session.
pub struct SyncParams {
    pub track: LyricTrack,
    pub state: PlaybackState,
    pub interval: Duration,
    pub mode: HighlightMode,
    /// Stop after the first frame with progress 1.0 instead of polling forever.
    pub stop_at_end: bool,
}

/// Owner-side handle of a running sync thread. Dropping it cancels the loop.
pub struct SyncHandle {
    cancel_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn cancel(&mut self) {
        // Disconnecting the channel wakes the worker immediately.
        self.cancel_tx.take();
    }

    /// Cancel and wait for the thread to exit.
    pub fn stop(mut self) {
        self.cancel();
        self.join_thread();
    }

    fn join_thread(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Sync worker panicked");
            }
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel();
        self.join_thread();
    }
}

/// Spawn the polling loop. A frame is emitted immediately, then once per
/// `interval` until cancelled, the receiver is dropped, or the track ends
/// with `stop_at_end`.
pub fn spawn(params: SyncParams, clock: Arc<dyn Clock>) -> (Receiver<SyncMessage>, SyncHandle) {
    let (tx, rx) = crossbeam_channel::unbounded::<SyncMessage>();
    let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(0);

    let thread = thread::spawn(move || run_sync(&tx, &cancel_rx, &params, &*clock));

    (
        rx,
        SyncHandle {
            cancel_tx: Some(cancel_tx),
            thread: Some(thread),
        },
    )
}

fn run_sync(
    tx: &Sender<SyncMessage>,
    cancel_rx: &Receiver<()>,
    params: &SyncParams,
    clock: &dyn Clock,
) {
    let ticker = crossbeam_channel::tick(params.interval);
    let duration = params.state.duration_seconds();
    log::debug!(
        "Sync loop started: {} lines, {duration:.1}s, every {:?}",
        params.track.len(),
        params.interval
    );

    loop {
        let elapsed = params.state.elapsed_at(clock.now());
        let frame = match PlaybackSync::frame(&params.track, elapsed, duration, params.mode) {
            Ok(frame) => frame,
            Err(e) => {
                let _ = tx.send(SyncMessage::Error(e.to_string()));
                return;
            }
        };

        let done = params.stop_at_end && frame.is_complete();
        if tx.send(SyncMessage::Frame(frame)).is_err() {
            log::debug!("Sync receiver dropped, stopping");
            return;
        }
        if done {
            let _ = tx.send(SyncMessage::Finished);
            return;
        }

        select! {
            recv(cancel_rx) -> _ => {
                let _ = tx.send(SyncMessage::Cancelled);
                return;
            }
            recv(ticker) -> _ => {}
        }
    }
}
