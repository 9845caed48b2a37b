//! Tokio-backed scheduler and the system clock.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::{clamp_interval, Clock, Scheduler, TickCallback, TimerHandle};

/// Runs each timer as a task on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Schedule timers on the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedule timers on the runtime of the calling context.
    ///
    /// Returns `None` outside a tokio runtime.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, interval: Duration, mut callback: TickCallback) -> TimerHandle {
        let interval = clamp_interval(interval);
        let token = CancellationToken::new();
        let cancel = token.clone();

        self.handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => {
                        trace!(?interval, "Timer cancelled");
                        break;
                    }

                    _ = ticker.tick() => callback(),
                }
            }
        });

        TimerHandle::new(token)
    }
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
