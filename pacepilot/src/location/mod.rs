//! Location input for the tracker.
//!
//! This module turns raw platform location updates into a sequence of
//! [`PositionFix`] values the tracker can trust.
//!
//! # Architecture
//!
//! ```text
//! platform ──► ChannelLocationProvider::deliver ──► LocationStream ──► PaceTracker::on_fix
//!                     ▲                                 (FixFilter)
//!                     └── configure / start / stop ◄── PaceTracker
//! ```
//!
//! Fixes with a non-positive horizontal accuracy are unresolved and dropped
//! without error. Authorization is a precondition read by the tracker; this
//! module never requests it on its own.

mod fix;
mod provider;
mod sampling;
mod stream;

pub use fix::{haversine_m, PositionFix, EARTH_RADIUS_M};
pub use provider::{AuthorizationStatus, ChannelLocationProvider, LocationProvider};
pub use sampling::{DesiredAccuracy, FixFilter, SamplingConfig};
pub use stream::LocationStream;
