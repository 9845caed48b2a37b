//! Task forwarding location fixes into the tracker.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::PaceTracker;
use crate::location::LocationStream;

/// Forward every fix from `stream` into `tracker` until cancelled or the
/// stream ends.
///
/// The pump runs for the lifetime of the location subscription, not of a
/// session: fixes that arrive while the tracker is idle are ignored by
/// [`PaceTracker::on_fix`]. Must be called from within a tokio runtime.
pub fn spawn_fix_pump(
    mut stream: LocationStream,
    tracker: PaceTracker,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("Fix pump cancelled");
                    break;
                }

                next = stream.next() => match next {
                    Some(fix) => {
                        tracker.on_fix(fix);
                    }
                    None => {
                        debug!("Location stream closed");
                        break;
                    }
                },
            }
        }
    })
}
