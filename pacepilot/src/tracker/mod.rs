//! Pace and distance tracking.
//!
//! [`PaceTracker`] owns the session lifecycle and all tracking state:
//!
//! ```text
//!            start()                     stop()
//!   Idle ───────────────► Tracking ───────────────► Stopped ──► Idle
//!    ▲   (auth granted)      │ on_fix: distance += segment      │
//!    │                       │ 1 s tick: elapsed                │
//!    │                       │ pace tick: pace + announcement   │
//!    └──────────────────────────────────────────────────────────┘
//!                       record emitted if duration > 0 && distance > 0
//! ```
//!
//! Fixes and timer ticks may arrive from different threads; every event
//! takes the same lock, and ticks carry the session generation they were
//! scheduled for so a tick that fires after `stop()` (or into a later
//! session) does nothing. Snapshots are published and announcements spoken
//! while the lock is held, so observers see events in the order they were
//! applied.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pacepilot::location::{ChannelLocationProvider, AuthorizationStatus};
//! use pacepilot::scheduler::ManualScheduler;
//! use pacepilot::tracker::PaceTracker;
//!
//! let (provider, stream) = ChannelLocationProvider::new(Default::default());
//! provider.set_authorization(AuthorizationStatus::AuthorizedWhenInUse);
//! let clock = Arc::new(ManualScheduler::starting_now());
//!
//! let tracker = PaceTracker::builder(Arc::new(provider))
//!     .manual_clock(clock.clone())
//!     .build()?;
//!
//! tracker.start()?;
//! tracker.on_fix(fix_a);
//! tracker.on_fix(fix_b);
//! clock.advance(Duration::from_secs(30)); // pace tick
//! let record = tracker.stop()?;
//! ```

mod pump;
mod record;
mod state;

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::announcer::{Announcement, Announcer, LifecycleCue};
use crate::config::TrackerSettings;
use crate::error::TrackerError;
use crate::history::WorkoutSink;
use crate::location::{LocationProvider, PositionFix};
use crate::mode::ExerciseMode;
use crate::scheduler::{
    Clock, ManualScheduler, Scheduler, SystemClock, TickCallback, TimerHandle, TokioScheduler,
};

pub use pump::spawn_fix_pump;
pub use record::WorkoutRecord;
pub use state::{average_pace, SessionState, TrackingSnapshot};

use state::Session;

/// Interval of the elapsed-time tick.
pub const ELAPSED_TICK: Duration = Duration::from_secs(1);

/// Tracks one session at a time.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct PaceTracker {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<Guarded>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    location: Arc<dyn LocationProvider>,
    announcer: Option<Announcer>,
    sink: Option<Arc<dyn WorkoutSink>>,
    settings: TrackerSettings,
    snapshot_tx: watch::Sender<TrackingSnapshot>,
}

/// State guarded by the tracker lock.
struct Guarded {
    session: Session,
    timers: Vec<TimerHandle>,
}

#[derive(Debug, Clone, Copy)]
enum Tick {
    Elapsed,
    Pace,
}

impl std::fmt::Debug for PaceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaceTracker")
            .field("snapshot", &self.snapshot())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl PaceTracker {
    /// Start building a tracker fed by `location`.
    pub fn builder(location: Arc<dyn LocationProvider>) -> PaceTrackerBuilder {
        PaceTrackerBuilder::new(location)
    }

    /// Begin a new session.
    ///
    /// Fails with [`TrackerError::PermissionDenied`] when location access is
    /// not granted, and with [`TrackerError::InvalidTransition`] unless idle.
    /// Neither failure changes any state.
    pub fn start(&self) -> Result<(), TrackerError> {
        let inner = &self.inner;

        let mode = {
            let mut guarded = inner.state.lock();
            let state = guarded.session.state();
            if state != SessionState::Idle {
                return Err(TrackerError::InvalidTransition {
                    operation: "start",
                    state,
                });
            }

            let status = inner.location.authorization();
            if !status.is_granted() {
                warn!(%status, "Cannot start tracking without location permission");
                return Err(TrackerError::PermissionDenied(status));
            }

            let generation = guarded.session.next_generation();
            let mode = guarded.session.mode();
            let pace_interval = inner.settings.pace_interval(mode);

            // Timers first: the session only begins once they exist.
            // Scheduling never runs a callback synchronously, so the lock is safe here.
            guarded.timers = vec![
                inner
                    .scheduler
                    .schedule_repeating(ELAPSED_TICK, self.tick_callback(generation, Tick::Elapsed)),
                inner
                    .scheduler
                    .schedule_repeating(pace_interval, self.tick_callback(generation, Tick::Pace)),
            ];
            debug!(?pace_interval, "Session timers scheduled");

            guarded.session.begin(inner.clock.now());
            inner.publish(guarded.session.snapshot());
            inner.cue(LifecycleCue::Started(mode));
            mode
        };

        inner.location.configure(mode.sampling());
        inner.location.start_updates();
        Ok(())
    }

    /// End the current session.
    ///
    /// Returns the finalized record, or `None` when the session had no
    /// distance or no duration. The record is also handed to the sink.
    pub fn stop(&self) -> Result<Option<WorkoutRecord>, TrackerError> {
        let inner = &self.inner;

        let (record, timers) = {
            let mut guarded = inner.state.lock();
            let state = guarded.session.state();
            if state != SessionState::Tracking {
                return Err(TrackerError::InvalidTransition {
                    operation: "stop",
                    state,
                });
            }

            let timers = std::mem::take(&mut guarded.timers);
            let mode = guarded.session.mode();
            let record = guarded.session.finish(inner.clock.now());
            inner.publish(guarded.session.snapshot());
            inner.cue(LifecycleCue::Stopped(mode));
            (record, timers)
        };

        for timer in &timers {
            timer.cancel();
        }
        inner.location.stop_updates();

        if let Some(record) = &record {
            info!(
                id = %record.id(),
                mode = %record.mode(),
                distance_m = record.distance_m(),
                duration_s = record.duration_seconds(),
                pace = record.average_pace_min_per_km(),
                "Workout recorded"
            );
            if let Some(sink) = &inner.sink {
                sink.record_completed(record);
            }
        }

        Ok(record)
    }

    /// Feed one position fix.
    ///
    /// Ignored outside a session and for unresolved fixes. Returns whether
    /// the fix was applied.
    pub fn on_fix(&self, fix: PositionFix) -> bool {
        let mut guarded = self.inner.state.lock();
        if guarded.session.state() != SessionState::Tracking {
            trace!("Ignoring fix outside a session");
            return false;
        }
        if !fix.is_valid() {
            trace!(accuracy = fix.horizontal_accuracy_m, "Ignoring unresolved fix");
            return false;
        }
        guarded.session.apply_fix(fix);
        self.inner.publish(guarded.session.snapshot());
        true
    }

    /// Recompute pace now instead of waiting for the next pace tick.
    ///
    /// Returns the new pace, `None` while it is still undefined.
    pub fn recompute_pace(&self) -> Result<Option<f64>, TrackerError> {
        let mut guarded = self.inner.state.lock();
        let state = guarded.session.state();
        if state != SessionState::Tracking {
            return Err(TrackerError::InvalidTransition {
                operation: "recompute pace",
                state,
            });
        }
        let pace = guarded.session.recompute_pace(self.inner.clock.now());
        self.inner.publish(guarded.session.snapshot());
        Ok(pace)
    }

    /// Switch exercise mode.
    ///
    /// While tracking, the new sampling configuration is pushed to the
    /// location service immediately. Accumulated distance and pace are kept.
    pub fn set_mode(&self, mode: ExerciseMode) {
        let tracking = {
            let mut guarded = self.inner.state.lock();
            guarded.session.set_mode(mode);
            self.inner.publish(guarded.session.snapshot());
            guarded.session.state() == SessionState::Tracking
        };

        debug!(%mode, tracking, "Exercise mode changed");
        if tracking {
            self.inner.location.configure(mode.sampling());
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> TrackingSnapshot {
        self.inner.state.lock().session.snapshot()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<TrackingSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Settings this tracker was built with.
    pub fn settings(&self) -> &TrackerSettings {
        &self.inner.settings
    }

    fn tick_callback(&self, generation: u64, tick: Tick) -> TickCallback {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                match tick {
                    Tick::Elapsed => inner.on_elapsed_tick(generation),
                    Tick::Pace => inner.on_pace_tick(generation),
                }
            }
        })
    }
}

impl Inner {
    fn on_elapsed_tick(&self, generation: u64) {
        let mut guarded = self.state.lock();
        if !guarded.session.is_current(generation) {
            trace!(generation, "Stale elapsed tick");
            return;
        }
        guarded.session.update_elapsed(self.clock.now());
        self.publish(guarded.session.snapshot());
    }

    fn on_pace_tick(&self, generation: u64) {
        let mut guarded = self.state.lock();
        if !guarded.session.is_current(generation) {
            trace!(generation, "Stale pace tick");
            return;
        }
        let now = self.clock.now();
        guarded.session.update_elapsed(now);
        guarded.session.recompute_pace(now);
        let snapshot = guarded.session.snapshot();
        self.publish(snapshot);

        if let Some(announcer) = &self.announcer {
            announcer.announce(&Announcement {
                pace_min_per_km: snapshot.current_pace_min_per_km,
                distance_m: snapshot.distance_m,
                mode: snapshot.mode,
            });
        }
    }

    /// Callers hold the state lock.
    fn publish(&self, snapshot: TrackingSnapshot) {
        self.snapshot_tx.send_replace(snapshot);
    }

    fn cue(&self, cue: LifecycleCue) {
        if let Some(announcer) = &self.announcer {
            announcer.announce_cue(cue);
        }
    }
}

/// Builder for [`PaceTracker`].
///
/// Without an explicit scheduler, timers run on the current tokio runtime
/// against the system clock.
pub struct PaceTrackerBuilder {
    location: Arc<dyn LocationProvider>,
    scheduler: Option<Arc<dyn Scheduler>>,
    clock: Option<Arc<dyn Clock>>,
    announcer: Option<Announcer>,
    sink: Option<Arc<dyn WorkoutSink>>,
    settings: TrackerSettings,
    mode: ExerciseMode,
}

impl PaceTrackerBuilder {
    fn new(location: Arc<dyn LocationProvider>) -> Self {
        Self {
            location,
            scheduler: None,
            clock: None,
            announcer: None,
            sink: None,
            settings: TrackerSettings::default(),
            mode: ExerciseMode::default(),
        }
    }

    /// Timer source.
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Time source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use one manual scheduler as both timer and time source.
    pub fn manual_clock(self, manual: Arc<ManualScheduler>) -> Self {
        self.scheduler(manual.clone()).clock(manual)
    }

    pub fn announcer(mut self, announcer: Announcer) -> Self {
        self.announcer = Some(announcer);
        self
    }

    /// Receiver of finalized records.
    pub fn sink(mut self, sink: Arc<dyn WorkoutSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn settings(mut self, settings: TrackerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Initial exercise mode.
    pub fn mode(mut self, mode: ExerciseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the tracker.
    ///
    /// Fails with [`TrackerError::NoScheduler`] when no scheduler was given
    /// and there is no tokio runtime to fall back on.
    pub fn build(self) -> Result<PaceTracker, TrackerError> {
        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioScheduler::try_current().ok_or(TrackerError::NoScheduler)?),
        };
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let session = Session::new(self.mode);
        let (snapshot_tx, _) = watch::channel(session.snapshot());

        Ok(PaceTracker {
            inner: Arc::new(Inner {
                state: Mutex::new(Guarded {
                    session,
                    timers: Vec::new(),
                }),
                scheduler,
                clock,
                location: self.location,
                announcer: self.announcer,
                sink: self.sink,
                settings: self.settings,
                snapshot_tx,
            }),
        })
    }
}
