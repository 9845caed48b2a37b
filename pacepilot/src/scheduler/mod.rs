//! Timer and clock abstraction.
//!
//! The tracker never creates timers itself. It asks a [`Scheduler`] for a
//! repeating callback and keeps the returned [`TimerHandle`]; dropping or
//! cancelling the handle stops the timer. Time is read through a [`Clock`].
//!
//! Two implementations are provided:
//!
//! - [`TokioScheduler`] + [`SystemClock`]: real timers on a tokio runtime.
//! - [`ManualScheduler`]: a fake clock that fires callbacks only when
//!   advanced, for deterministic tests and track replay.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use pacepilot::scheduler::{ManualScheduler, Scheduler};
//!
//! let scheduler = ManualScheduler::starting_now();
//! let handle = scheduler.schedule_repeating(Duration::from_secs(1), Box::new(|| {
//!     println!("tick");
//! }));
//! scheduler.advance(Duration::from_secs(3)); // prints "tick" three times
//! handle.cancel();
//! ```

mod manual;
mod realtime;

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

pub use manual::ManualScheduler;
pub use realtime::{SystemClock, TokioScheduler};

/// Shortest interval a scheduler will honor.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Longest interval a scheduler will honor.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Bring `interval` into `MIN_INTERVAL..=MAX_INTERVAL`.
pub(crate) fn clamp_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_INTERVAL, MAX_INTERVAL)
}

/// Callback run on every timer tick.
pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

/// Source of repeating timers.
pub trait Scheduler: Send + Sync {
    /// Run `callback` every `interval`, first after one full interval.
    fn schedule_repeating(&self, interval: Duration, callback: TickCallback) -> TimerHandle;
}

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Handle to a repeating timer.
///
/// The timer stops when the handle is cancelled or dropped.
#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Wrap a cancellation token shared with the timer.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Stop the timer. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the timer has been stopped.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_cancel_is_idempotent() {
        let token = CancellationToken::new();
        let handle = TimerHandle::new(token.clone());
        assert!(!handle.is_cancelled());

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_interval_is_clamped() {
        assert_eq!(clamp_interval(Duration::ZERO), MIN_INTERVAL);
        assert_eq!(clamp_interval(Duration::from_secs(30)), Duration::from_secs(30));
        assert_eq!(clamp_interval(Duration::from_secs(u64::MAX)), MAX_INTERVAL);
    }

    #[test]
    fn test_drop_cancels() {
        let token = CancellationToken::new();
        drop(TimerHandle::new(token.clone()));
        assert!(token.is_cancelled());
    }
}
