//! Position fixes and great-circle distance.
//!
//! A [`PositionFix`] is one report from the platform location service. Fixes
//! are ephemeral: the tracker only keeps the most recent one to measure the
//! next segment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A single position report from the location service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// When the platform resolved this fix.
    pub timestamp: DateTime<Utc>,
    /// Radius of horizontal uncertainty in meters.
    ///
    /// Non-positive values mark an unresolved fix.
    pub horizontal_accuracy_m: f64,
}

impl PositionFix {
    /// Create a new fix.
    pub fn new(
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
        horizontal_accuracy_m: f64,
    ) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            horizontal_accuracy_m,
        }
    }

    /// Whether the platform actually resolved this fix.
    pub fn is_valid(&self) -> bool {
        self.horizontal_accuracy_m > 0.0
    }

    /// Great-circle distance to another fix in meters.
    pub fn distance_to(&self, other: &PositionFix) -> f64 {
        haversine_m(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine distance between two WGS84 points in meters.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: f64, lon: f64, accuracy: f64) -> PositionFix {
        PositionFix::new(lat, lon, Utc::now(), accuracy)
    }

    #[test]
    fn test_validity_requires_positive_accuracy() {
        assert!(fix(0.0, 0.0, 5.0).is_valid());
        assert!(!fix(0.0, 0.0, 0.0).is_valid());
        assert!(!fix(0.0, 0.0, -1.0).is_valid());
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let a = fix(53.5, 10.0, 5.0);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_equator_longitude_step() {
        // 0.009° of longitude on the equator is just over a kilometer
        let d = haversine_m(0.0, 0.0, 0.0, 0.009);
        assert!((d - 1000.75).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = haversine_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = fix(31.2304, 121.4737, 5.0);
        let b = fix(31.2400, 121.4800, 5.0);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_points() {
        let d = haversine_m(0.0, 0.0, 0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half_circumference).abs() < 1.0);
    }

    #[test]
    fn test_fix_json_shape() {
        let json = r#"{
            "latitude": 1.5,
            "longitude": 2.5,
            "timestamp": "2026-03-01T07:00:00Z",
            "horizontal_accuracy_m": 4.0
        }"#;
        let parsed: PositionFix = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.latitude, 1.5);
        assert_eq!(parsed.horizontal_accuracy_m, 4.0);
        assert_eq!(parsed.timestamp.to_rfc3339(), "2026-03-01T07:00:00+00:00");
    }
}
