//! Finalized workout records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::format::{distance_string, duration_string, pace_string};
use crate::mode::ExerciseMode;

/// One completed session.
///
/// Built once when a session stops with both a positive duration and a
/// positive distance. Fields are read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    id: Uuid,
    started_at: DateTime<Utc>,
    duration_seconds: f64,
    distance_m: f64,
    average_pace_min_per_km: f64,
    mode: ExerciseMode,
}

impl WorkoutRecord {
    pub(crate) fn new(
        started_at: DateTime<Utc>,
        duration_seconds: f64,
        distance_m: f64,
        average_pace_min_per_km: f64,
        mode: ExerciseMode,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            duration_seconds,
            distance_m,
            average_pace_min_per_km,
            mode,
        }
    }

    /// Unique record id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the session started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Session length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Distance covered in meters.
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// Lifetime average pace at the moment of stop, minutes per kilometer.
    pub fn average_pace_min_per_km(&self) -> f64 {
        self.average_pace_min_per_km
    }

    /// Mode the session ended in.
    pub fn mode(&self) -> ExerciseMode {
        self.mode
    }

    pub fn pace_string(&self) -> String {
        pace_string(Some(self.average_pace_min_per_km))
    }

    pub fn distance_string(&self) -> String {
        distance_string(self.distance_m)
    }

    pub fn duration_string(&self) -> String {
        duration_string(self.duration_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let now = Utc::now();
        let a = WorkoutRecord::new(now, 360.0, 1200.0, 5.0, ExerciseMode::Running);
        let b = WorkoutRecord::new(now, 360.0, 1200.0, 5.0, ExerciseMode::Running);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_accessors_report_finished_values() {
        let start = Utc::now();
        let record = WorkoutRecord::new(start, 360.0, 1200.0, 5.0, ExerciseMode::Walking);
        assert_eq!(record.started_at(), start);
        assert_eq!(record.duration_seconds(), 360.0);
        assert_eq!(record.distance_m(), 1200.0);
        assert_eq!(record.average_pace_min_per_km(), 5.0);
        assert_eq!(record.mode(), ExerciseMode::Walking);

        let copy = record.clone();
        assert_eq!(copy.id(), record.id());
    }

    #[test]
    fn test_display_strings() {
        let record = WorkoutRecord::new(Utc::now(), 3725.0, 10_500.0, 5.9, ExerciseMode::Running);
        assert_eq!(record.distance_string(), "10.50公里");
        assert_eq!(record.duration_string(), "1:02:05");
        assert_eq!(record.pace_string(), "5:54");
    }

    #[test]
    fn test_json_hand_off() {
        let record = WorkoutRecord::new(Utc::now(), 600.0, 1500.0, 6.67, ExerciseMode::Walking);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"mode\":\"walking\""));

        let back: WorkoutRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
