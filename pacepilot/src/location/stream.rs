//! Lazy stream of filtered position fixes.

use tokio::sync::{mpsc, watch};
use tracing::trace;

use super::fix::PositionFix;
use super::sampling::{FixFilter, SamplingConfig};

/// Control state shared by a provider and its stream.
///
/// `epoch` advances every time updates are started, so the stream can tell
/// one session's fixes from the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StreamControl {
    pub(crate) sampling: SamplingConfig,
    pub(crate) epoch: u64,
}

/// A raw fix tagged with the epoch it was delivered in.
pub(crate) type TaggedFix = (u64, PositionFix);

/// Sequence of valid fixes from the location service.
///
/// Raw fixes arrive on an unbounded channel. Each one is run through a
/// [`FixFilter`] using the latest sampling configuration published on the
/// watch channel, so a mode change takes effect from the next fix. When
/// updates are restarted the filter starts over and fixes still queued from
/// the previous run are dropped.
#[derive(Debug)]
pub struct LocationStream {
    fixes: mpsc::UnboundedReceiver<TaggedFix>,
    control: watch::Receiver<StreamControl>,
    epoch: u64,
    filter: FixFilter,
}

impl LocationStream {
    /// Build a stream from a raw fix channel and a control watch.
    pub(crate) fn new(
        fixes: mpsc::UnboundedReceiver<TaggedFix>,
        mut control: watch::Receiver<StreamControl>,
    ) -> Self {
        let initial = *control.borrow_and_update();
        Self {
            fixes,
            control,
            epoch: initial.epoch,
            filter: FixFilter::new(initial.sampling),
        }
    }

    /// Wait for the next accepted fix.
    ///
    /// Returns `None` once the producer side is gone.
    pub async fn next(&mut self) -> Option<PositionFix> {
        loop {
            let (epoch, raw) = self.fixes.recv().await?;
            self.refresh_control();
            if epoch < self.epoch {
                trace!(epoch, current = self.epoch, "Dropping fix from a previous run");
                continue;
            }
            if let Some(fix) = self.filter.accept(raw) {
                return Some(fix);
            }
        }
    }

    /// Sampling configuration currently applied.
    pub fn sampling(&self) -> SamplingConfig {
        self.filter.sampling()
    }

    fn refresh_control(&mut self) {
        // A closed sender keeps the last configuration
        if !self.control.has_changed().unwrap_or(false) {
            return;
        }
        let control = *self.control.borrow_and_update();
        self.filter.set_sampling(control.sampling);
        if control.epoch != self.epoch {
            trace!(epoch = control.epoch, "Updates restarted, resetting fix filter");
            self.epoch = control.epoch;
            self.filter.reset();
        }
    }
}
