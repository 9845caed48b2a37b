//! Display strings for pace, distance and duration.
//!
//! All functions here are pure. Strings use the metric, Chinese-labelled
//! format that announcements are spoken in.

/// Placeholder shown while pace is undefined.
pub const PACE_PLACEHOLDER: &str = "--:--";

/// Format a pace in minutes per kilometer as `M:SS`.
///
/// `None` (not enough data yet) and non-finite values render as `--:--`.
pub fn pace_string(pace_min_per_km: Option<f64>) -> String {
    let pace = match pace_min_per_km {
        Some(p) if p.is_finite() && p >= 0.0 => p,
        _ => return PACE_PLACEHOLDER.to_string(),
    };

    let minutes = pace.trunc();
    let seconds = ((pace - minutes) * 60.0).trunc();
    format!("{}:{:02}", minutes as u64, seconds as u64)
}

/// Format a distance: meters below 1 km, kilometers with two decimals above.
pub fn distance_string(distance_m: f64) -> String {
    if distance_m < 1000.0 {
        format!("{:.0}米", distance_m)
    } else {
        format!("{:.2}公里", distance_m / 1000.0)
    }
}

/// Format a duration as `MM:SS`, or `H:MM:SS` once it reaches an hour.
pub fn duration_string(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Format a distance goal.
pub fn target_string(target_m: f64) -> String {
    if target_m < 1000.0 {
        format!("目标: {:.0}米", target_m)
    } else {
        format!("目标: {:.1}公里", target_m / 1000.0)
    }
}

/// Fraction of the distance goal covered, clamped to `[0, 1]`.
pub fn target_progress(distance_m: f64, target_m: f64) -> f64 {
    if target_m <= 0.0 || !target_m.is_finite() {
        return 0.0;
    }
    (distance_m / target_m).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_placeholder() {
        assert_eq!(pace_string(None), "--:--");
        assert_eq!(pace_string(Some(f64::NAN)), "--:--");
        assert_eq!(pace_string(Some(f64::INFINITY)), "--:--");
    }

    #[test]
    fn test_pace_minutes_and_seconds() {
        assert_eq!(pace_string(Some(5.0)), "5:00");
        assert_eq!(pace_string(Some(5.5)), "5:30");
        assert_eq!(pace_string(Some(6.25)), "6:15");
        assert_eq!(pace_string(Some(12.75)), "12:45");
    }

    #[test]
    fn test_pace_truncates_seconds() {
        // 4.996 min = 4 min 59.76 s
        assert_eq!(pace_string(Some(4.996)), "4:59");
    }

    #[test]
    fn test_distance_meters() {
        assert_eq!(distance_string(0.0), "0米");
        assert_eq!(distance_string(523.4), "523米");
        assert_eq!(distance_string(999.4), "999米");
    }

    #[test]
    fn test_distance_kilometers() {
        assert_eq!(distance_string(1000.0), "1.00公里");
        assert_eq!(distance_string(1000.75), "1.00公里");
        assert_eq!(distance_string(5234.0), "5.23公里");
        assert_eq!(distance_string(21500.0), "21.50公里");
    }

    #[test]
    fn test_duration_under_an_hour() {
        assert_eq!(duration_string(0.0), "00:00");
        assert_eq!(duration_string(59.9), "00:59");
        assert_eq!(duration_string(360.0), "06:00");
        assert_eq!(duration_string(3599.0), "59:59");
    }

    #[test]
    fn test_duration_promotes_to_hours() {
        assert_eq!(duration_string(3600.0), "1:00:00");
        assert_eq!(duration_string(3725.0), "1:02:05");
        assert_eq!(duration_string(36_000.0), "10:00:00");
    }

    #[test]
    fn test_duration_negative_is_zero() {
        assert_eq!(duration_string(-5.0), "00:00");
    }

    #[test]
    fn test_target_string() {
        assert_eq!(target_string(800.0), "目标: 800米");
        assert_eq!(target_string(5000.0), "目标: 5.0公里");
        assert_eq!(target_string(21097.5), "目标: 21.1公里");
    }

    #[test]
    fn test_target_progress() {
        assert_eq!(target_progress(2500.0, 5000.0), 0.5);
        assert_eq!(target_progress(6000.0, 5000.0), 1.0);
        assert_eq!(target_progress(100.0, 0.0), 0.0);
        assert_eq!(target_progress(0.0, 5000.0), 0.0);
    }
}
