//! Hand-off of finished workouts.
//!
//! The tracker does not store records. It passes each one to a
//! [`WorkoutSink`] owned by the application, which persists it however it
//! likes. [`WorkoutHistory`] is an in-memory sink for callers that just want
//! the list.

use parking_lot::RwLock;
use tracing::debug;

use crate::tracker::WorkoutRecord;

/// Receiver of finalized workout records.
pub trait WorkoutSink: Send + Sync {
    /// Called once per recorded session, after the tracker lock is released.
    fn record_completed(&self, record: &WorkoutRecord);
}

/// Append-only in-memory list of records.
#[derive(Debug, Default)]
pub struct WorkoutHistory {
    records: RwLock<Vec<WorkoutRecord>>,
}

impl WorkoutHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the history with previously stored records.
    pub fn with_records(records: Vec<WorkoutRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Copy of all records, oldest first.
    pub fn records(&self) -> Vec<WorkoutRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Most recent record.
    pub fn latest(&self) -> Option<WorkoutRecord> {
        self.records.read().last().cloned()
    }

    /// Sum of all recorded distances in meters.
    pub fn total_distance_m(&self) -> f64 {
        self.records.read().iter().map(|r| r.distance_m()).sum()
    }

    /// Sum of all recorded durations in seconds.
    pub fn total_duration_seconds(&self) -> f64 {
        self.records.read().iter().map(|r| r.duration_seconds()).sum()
    }
}

impl WorkoutSink for WorkoutHistory {
    fn record_completed(&self, record: &WorkoutRecord) {
        let mut records = self.records.write();
        records.push(record.clone());
        debug!(count = records.len(), "Workout appended to history");
    }
}
