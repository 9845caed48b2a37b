//! Manually advanced scheduler and clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{clamp_interval, Clock, Scheduler, TickCallback, TimerHandle};

/// A fake clock that only moves when told to.
///
/// Timers fire in due-time order while [`advance`](Self::advance) or
/// [`advance_to`](Self::advance_to) walks the clock forward. During a
/// callback, [`Clock::now`] reports the tick's due time. Callbacks run with no
/// internal lock held, so they may read the clock or cancel timers.
#[derive(Debug)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    next_id: u64,
    timers: Vec<ManualTimer>,
}

struct ManualTimer {
    id: u64,
    interval: Duration,
    next_due: DateTime<Utc>,
    token: CancellationToken,
    callback: Arc<Mutex<TickCallback>>,
}

impl std::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTimer")
            .field("id", &self.id)
            .field("interval", &self.interval)
            .field("next_due", &self.next_due)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

impl ManualScheduler {
    /// Create a scheduler whose clock reads `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(ManualState {
                now: start,
                next_id: 0,
                timers: Vec::new(),
            }),
        }
    }

    /// Create a scheduler starting at the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward, firing every timer that falls due.
    ///
    /// Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = later(self.now(), by);
        self.advance_to(target)
    }

    /// Move the clock to `target`, firing every timer that falls due.
    ///
    /// A target in the past leaves the clock where it is.
    pub fn advance_to(&self, target: DateTime<Utc>) -> usize {
        let mut fired = 0;

        loop {
            let due = {
                let mut state = self.state.lock();
                state.timers.retain(|t| !t.token.is_cancelled());

                let next = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.next_due <= target)
                    .min_by_key(|(_, t)| (t.next_due, t.id))
                    .map(|(idx, _)| idx);

                match next {
                    Some(idx) => {
                        let timer = &mut state.timers[idx];
                        let at = timer.next_due;
                        timer.next_due = later(at, timer.interval);
                        let callback = Arc::clone(&timer.callback);
                        let token = timer.token.clone();
                        // Stuck at the end of time: fire once more, then retire
                        if timer.next_due == at {
                            state.timers.swap_remove(idx);
                        }
                        if at > state.now {
                            state.now = at;
                        }
                        Some((callback, token))
                    }
                    None => {
                        if target > state.now {
                            state.now = target;
                        }
                        None
                    }
                }
            };

            let Some((callback, token)) = due else {
                return fired;
            };

            if !token.is_cancelled() {
                let mut callback = callback.lock();
                (*callback)();
                fired += 1;
            }
        }
    }

    /// Number of timers that have not been cancelled.
    pub fn active_timers(&self) -> usize {
        self.state
            .lock()
            .timers
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::starting_now()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, interval: Duration, callback: TickCallback) -> TimerHandle {
        let interval = clamp_interval(interval);
        let token = CancellationToken::new();

        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let next_due = later(state.now, interval);
        state.timers.push(ManualTimer {
            id,
            interval,
            next_due,
            token: token.clone(),
            callback: Arc::new(Mutex::new(callback)),
        });

        TimerHandle::new(token)
    }
}

impl Clock for ManualScheduler {
    fn now(&self) -> DateTime<Utc> {
        self.state.lock().now
    }
}

/// `at + by`, saturating at the latest representable time.
fn later(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|by| at.checked_add_signed(by))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
