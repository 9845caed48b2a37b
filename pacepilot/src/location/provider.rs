//! Location service collaborator.
//!
//! The tracker never talks to a platform API directly. It reads authorization,
//! pushes sampling parameters and starts/stops updates through
//! [`LocationProvider`]; fixes arrive separately through a
//! [`LocationStream`](super::LocationStream).

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use super::fix::PositionFix;
use super::sampling::SamplingConfig;
use super::stream::{LocationStream, StreamControl, TaggedFix};

/// Location authorization as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    /// The user has not been asked yet.
    #[default]
    NotDetermined,
    /// Location use is blocked by policy.
    Restricted,
    /// The user refused.
    Denied,
    /// Allowed while the app is in use.
    AuthorizedWhenInUse,
    /// Allowed at all times.
    AuthorizedAlways,
}

impl AuthorizationStatus {
    /// Whether tracking may start.
    pub fn is_granted(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedWhenInUse | AuthorizationStatus::AuthorizedAlways
        )
    }
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorizationStatus::NotDetermined => write!(f, "not determined"),
            AuthorizationStatus::Restricted => write!(f, "restricted"),
            AuthorizationStatus::Denied => write!(f, "denied"),
            AuthorizationStatus::AuthorizedWhenInUse => write!(f, "authorized when in use"),
            AuthorizationStatus::AuthorizedAlways => write!(f, "authorized always"),
        }
    }
}

/// Platform location service as seen by the tracker.
pub trait LocationProvider: Send + Sync {
    /// Current authorization status.
    fn authorization(&self) -> AuthorizationStatus;

    /// Ask the user for permission. The answer arrives asynchronously.
    fn request_authorization(&self);

    /// Apply new sampling parameters.
    fn configure(&self, sampling: SamplingConfig);

    /// Begin delivering fixes.
    fn start_updates(&self);

    /// Stop delivering fixes.
    fn stop_updates(&self);
}

/// In-process location provider backed by tokio channels.
///
/// Whatever produces raw fixes (a platform bridge, a replay, a test) calls
/// [`deliver`](Self::deliver); fixes only pass through while updates are
/// started. Sampling changes are forwarded to the paired stream.
#[derive(Debug)]
pub struct ChannelLocationProvider {
    authorization: Mutex<AuthorizationStatus>,
    updating: AtomicBool,
    control_tx: watch::Sender<StreamControl>,
    fix_tx: mpsc::UnboundedSender<TaggedFix>,
}

impl ChannelLocationProvider {
    /// Create a provider and the stream it feeds.
    pub fn new(initial: SamplingConfig) -> (Self, LocationStream) {
        let (fix_tx, fix_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = watch::channel(StreamControl {
            sampling: initial,
            epoch: 0,
        });

        let provider = Self {
            authorization: Mutex::new(AuthorizationStatus::NotDetermined),
            updating: AtomicBool::new(false),
            control_tx,
            fix_tx,
        };
        (provider, LocationStream::new(fix_rx, control_rx))
    }

    /// Record an authorization change reported by the platform.
    pub fn set_authorization(&self, status: AuthorizationStatus) {
        debug!(%status, "Location authorization changed");
        *self.authorization.lock() = status;
    }

    /// Whether updates are currently started.
    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    /// Currently requested sampling parameters.
    pub fn sampling(&self) -> SamplingConfig {
        self.control_tx.borrow().sampling
    }

    /// Hand a raw fix to the stream.
    ///
    /// Returns false if updates are stopped or the stream is gone.
    pub fn deliver(&self, fix: PositionFix) -> bool {
        if !self.is_updating() {
            trace!("Dropping fix delivered while updates are stopped");
            return false;
        }
        let epoch = self.control_tx.borrow().epoch;
        self.fix_tx.send((epoch, fix)).is_ok()
    }
}

impl LocationProvider for ChannelLocationProvider {
    fn authorization(&self) -> AuthorizationStatus {
        *self.authorization.lock()
    }

    fn request_authorization(&self) {
        debug!("Location authorization requested");
    }

    fn configure(&self, sampling: SamplingConfig) {
        debug!(
            accuracy = ?sampling.accuracy,
            distance_filter_m = sampling.distance_filter_m,
            "Applying sampling configuration"
        );
        self.control_tx.send_modify(|control| control.sampling = sampling);
    }

    fn start_updates(&self) {
        // New epoch first, so no fix of this run is tagged with the old one
        self.control_tx.send_modify(|control| control.epoch += 1);
        self.updating.store(true, Ordering::Release);
    }

    fn stop_updates(&self) {
        self.updating.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ExerciseMode;
    use chrono::Utc;

    #[test]
    fn test_authorization_granted() {
        assert!(AuthorizationStatus::AuthorizedWhenInUse.is_granted());
        assert!(AuthorizationStatus::AuthorizedAlways.is_granted());
        assert!(!AuthorizationStatus::NotDetermined.is_granted());
        assert!(!AuthorizationStatus::Denied.is_granted());
        assert!(!AuthorizationStatus::Restricted.is_granted());
    }

    #[test]
    fn test_provider_starts_undetermined() {
        let (provider, _stream) = ChannelLocationProvider::new(ExerciseMode::Running.sampling());
        assert_eq!(provider.authorization(), AuthorizationStatus::NotDetermined);

        provider.set_authorization(AuthorizationStatus::AuthorizedAlways);
        assert_eq!(provider.authorization(), AuthorizationStatus::AuthorizedAlways);
    }

    #[test]
    fn test_deliver_requires_started_updates() {
        let (provider, _stream) = ChannelLocationProvider::new(ExerciseMode::Running.sampling());
        let fix = PositionFix::new(0.0, 0.0, Utc::now(), 5.0);

        assert!(!provider.deliver(fix));
        provider.start_updates();
        assert!(provider.deliver(fix));
        provider.stop_updates();
        assert!(!provider.deliver(fix));
    }

    #[test]
    fn test_configure_updates_sampling() {
        let (provider, _stream) = ChannelLocationProvider::new(ExerciseMode::Running.sampling());
        provider.configure(ExerciseMode::Walking.sampling());
        assert_eq!(provider.sampling(), ExerciseMode::Walking.sampling());
    }
}
