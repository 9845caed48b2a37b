//! Session state machine and published snapshots.
//!
//! [`Session`] holds all mutable tracking state and the pure transition
//! logic. It knows nothing about timers, location services or speech; the
//! [`PaceTracker`](super::PaceTracker) drives it under a lock.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::record::WorkoutRecord;
use crate::format::{distance_string, duration_string, pace_string, target_progress};
use crate::location::PositionFix;
use crate::mode::ExerciseMode;

/// Lifecycle of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session running.
    #[default]
    Idle,
    /// Accumulating distance and time.
    Tracking,
    /// Session ended; folds back to `Idle` as soon as the record is built.
    Stopped,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Tracking => write!(f, "tracking"),
            SessionState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Average pace in minutes per kilometer.
///
/// Undefined (`None`) until both elapsed time and distance are positive.
pub fn average_pace(elapsed_seconds: f64, distance_m: f64) -> Option<f64> {
    if distance_m > 0.0 && elapsed_seconds > 0.0 {
        let seconds_per_km = elapsed_seconds / (distance_m / 1000.0);
        Some(seconds_per_km / 60.0)
    } else {
        None
    }
}

/// Read-only view of tracking state for UI and narration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackingSnapshot {
    pub state: SessionState,
    pub mode: ExerciseMode,
    /// Distance covered this session, in meters.
    pub distance_m: f64,
    /// Last computed pace in minutes per kilometer.
    pub current_pace_min_per_km: Option<f64>,
    /// Seconds since the session started, as of the last elapsed tick.
    pub elapsed_seconds: f64,
}

impl TrackingSnapshot {
    pub fn is_tracking(&self) -> bool {
        self.state == SessionState::Tracking
    }

    pub fn pace_string(&self) -> String {
        pace_string(self.current_pace_min_per_km)
    }

    pub fn distance_string(&self) -> String {
        distance_string(self.distance_m)
    }

    pub fn duration_string(&self) -> String {
        duration_string(self.elapsed_seconds)
    }

    /// Fraction of `target_m` covered so far.
    pub fn target_progress(&self, target_m: f64) -> f64 {
        target_progress(self.distance_m, target_m)
    }
}

/// Mutable tracking state.
#[derive(Debug, Default)]
pub(crate) struct Session {
    state: SessionState,
    mode: ExerciseMode,
    generation: u64,
    started_at: Option<DateTime<Utc>>,
    last_fix: Option<PositionFix>,
    distance_m: f64,
    current_pace: Option<f64>,
    elapsed_seconds: f64,
}

impl Session {
    pub(crate) fn new(mode: ExerciseMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn mode(&self) -> ExerciseMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: ExerciseMode) {
        self.mode = mode;
    }

    /// Whether a tick scheduled for `generation` should still act.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.state == SessionState::Tracking && self.generation == generation
    }

    /// Generation the next `begin` will hand out.
    pub(crate) fn next_generation(&self) -> u64 {
        self.generation + 1
    }

    /// Enter `Tracking` from a clean slate. Returns the new generation.
    pub(crate) fn begin(&mut self, now: DateTime<Utc>) -> u64 {
        self.reset_measurements();
        self.generation += 1;
        self.started_at = Some(now);
        self.state = SessionState::Tracking;
        debug!(generation = self.generation, mode = %self.mode, "Session started");
        self.generation
    }

    /// Add the segment from the previous fix. Returns the meters added.
    pub(crate) fn apply_fix(&mut self, fix: PositionFix) -> f64 {
        let delta = self
            .last_fix
            .as_ref()
            .map(|last| last.distance_to(&fix))
            .unwrap_or(0.0);
        self.distance_m += delta;
        self.last_fix = Some(fix);
        trace!(delta_m = delta, distance_m = self.distance_m, "Fix applied");
        delta
    }

    fn elapsed_at(&self, now: DateTime<Utc>) -> f64 {
        match self.started_at {
            Some(start) => ((now - start).num_milliseconds() as f64 / 1000.0).max(0.0),
            None => 0.0,
        }
    }

    pub(crate) fn update_elapsed(&mut self, now: DateTime<Utc>) -> f64 {
        self.elapsed_seconds = self.elapsed_at(now);
        self.elapsed_seconds
    }

    /// Recompute the cumulative average pace as of `now`.
    pub(crate) fn recompute_pace(&mut self, now: DateTime<Utc>) -> Option<f64> {
        let elapsed = self.elapsed_at(now);
        self.current_pace = average_pace(elapsed, self.distance_m);
        self.current_pace
    }

    /// End the session, build its record if it is long enough, and reset.
    pub(crate) fn finish(&mut self, now: DateTime<Utc>) -> Option<WorkoutRecord> {
        let duration = self.update_elapsed(now);
        let pace = self.recompute_pace(now);
        self.state = SessionState::Stopped;

        let record = match (self.started_at, pace) {
            (Some(started_at), Some(pace)) if duration > 0.0 && self.distance_m > 0.0 => Some(
                WorkoutRecord::new(started_at, duration, self.distance_m, pace, self.mode),
            ),
            _ => {
                debug!(
                    duration_s = duration,
                    distance_m = self.distance_m,
                    "Session too short to record"
                );
                None
            }
        };

        self.reset_measurements();
        self.started_at = None;
        self.state = SessionState::Idle;
        record
    }

    fn reset_measurements(&mut self) {
        self.last_fix = None;
        self.distance_m = 0.0;
        self.current_pace = None;
        self.elapsed_seconds = 0.0;
    }

    pub(crate) fn snapshot(&self) -> TrackingSnapshot {
        TrackingSnapshot {
            state: self.state,
            mode: self.mode,
            distance_m: self.distance_m,
            current_pace_min_per_km: self.current_pace,
            elapsed_seconds: self.elapsed_seconds,
        }
    }
}
