use std::time::Instant;

use super::playback_sync::SyncError;

/// Timing for one playback session: when it started and how long the audio is.
///
/// Fixed once created; there is no seeking. Restarting playback means
/// creating a new state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    started_at: Instant,
    duration_seconds: f64,
}

impl PlaybackState {
    pub fn new(started_at: Instant, duration_seconds: f64) -> Result<Self, SyncError> {
        if !(duration_seconds > 0.0) {
            return Err(SyncError::NonPositiveDuration(duration_seconds));
        }
        Ok(Self {
            started_at,
            duration_seconds,
        })
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Seconds between the start instant and `now`, never negative.
    pub fn elapsed_at(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.started_at).as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::time::Duration;

    #[test]
    fn test_elapsed_at() {
        let start = Instant::now();
        let state = PlaybackState::new(start, 120.0).unwrap();
        assert_relative_eq!(state.elapsed_at(start + Duration::from_millis(2500)), 2.5);
    }

    #[test]
    fn test_elapsed_before_start_is_zero() {
        let start = Instant::now() + Duration::from_secs(5);
        let state = PlaybackState::new(start, 120.0).unwrap();
        assert_eq!(state.elapsed_at(Instant::now()), 0.0);
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-3.0)]
    #[case::nan(f64::NAN)]
    fn test_rejects_non_positive_duration(#[case] duration: f64) {
        assert!(matches!(
            PlaybackState::new(Instant::now(), duration),
            Err(SyncError::NonPositiveDuration(_))
        ));
    }
}
