//! Exercise mode selection.
//!
//! The mode decides how finely the location service samples and how often
//! pace is recomputed and announced. Walkers move slower, so they get a finer
//! distance filter and a longer announcement interval.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::location::{DesiredAccuracy, SamplingConfig};

/// Pace recompute interval while running.
pub const RUNNING_PACE_INTERVAL: Duration = Duration::from_secs(30);

/// Pace recompute interval while walking.
pub const WALKING_PACE_INTERVAL: Duration = Duration::from_secs(60);

/// Kind of session being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseMode {
    /// Running: navigation-grade accuracy, 10 m filter, 30 s pace tick.
    #[default]
    Running,
    /// Walking: best accuracy, 5 m filter, 60 s pace tick.
    Walking,
}

impl ExerciseMode {
    /// All modes, in display order.
    pub const ALL: [ExerciseMode; 2] = [ExerciseMode::Running, ExerciseMode::Walking];

    /// Location sampling parameters for this mode.
    pub fn sampling(&self) -> SamplingConfig {
        match self {
            ExerciseMode::Running => SamplingConfig {
                accuracy: DesiredAccuracy::BestForNavigation,
                distance_filter_m: 10.0,
            },
            ExerciseMode::Walking => SamplingConfig {
                accuracy: DesiredAccuracy::Best,
                distance_filter_m: 5.0,
            },
        }
    }

    /// Default interval between pace recomputes (and announcements).
    pub fn pace_interval(&self) -> Duration {
        match self {
            ExerciseMode::Running => RUNNING_PACE_INTERVAL,
            ExerciseMode::Walking => WALKING_PACE_INTERVAL,
        }
    }

    /// Verb used in announcements for distance covered so far.
    pub fn progress_verb(&self) -> &'static str {
        match self {
            ExerciseMode::Running => "已跑",
            ExerciseMode::Walking => "已走",
        }
    }

    /// Display name shown to the user.
    pub fn display_name(&self) -> &'static str {
        match self {
            ExerciseMode::Running => "跑步",
            ExerciseMode::Walking => "步行",
        }
    }
}

impl std::fmt::Display for ExerciseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExerciseMode::Running => write!(f, "running"),
            ExerciseMode::Walking => write!(f, "walking"),
        }
    }
}

impl std::str::FromStr for ExerciseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "running" | "run" => Ok(ExerciseMode::Running),
            "walking" | "walk" => Ok(ExerciseMode::Walking),
            other => Err(format!("unknown exercise mode '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_running() {
        assert_eq!(ExerciseMode::default(), ExerciseMode::Running);
    }

    #[test]
    fn test_sampling_per_mode() {
        let running = ExerciseMode::Running.sampling();
        assert_eq!(running.accuracy, DesiredAccuracy::BestForNavigation);
        assert_eq!(running.distance_filter_m, 10.0);

        let walking = ExerciseMode::Walking.sampling();
        assert_eq!(walking.accuracy, DesiredAccuracy::Best);
        assert_eq!(walking.distance_filter_m, 5.0);
    }

    #[test]
    fn test_pace_intervals() {
        assert_eq!(ExerciseMode::Running.pace_interval(), Duration::from_secs(30));
        assert_eq!(ExerciseMode::Walking.pace_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_verbs_and_names() {
        assert_eq!(ExerciseMode::Running.progress_verb(), "已跑");
        assert_eq!(ExerciseMode::Walking.progress_verb(), "已走");
        assert_eq!(ExerciseMode::Running.display_name(), "跑步");
        assert_eq!(ExerciseMode::Walking.display_name(), "步行");
    }

    #[test]
    fn test_parse() {
        assert_eq!("Running".parse::<ExerciseMode>(), Ok(ExerciseMode::Running));
        assert_eq!(" walk ".parse::<ExerciseMode>(), Ok(ExerciseMode::Walking));
        assert!("cycling".parse::<ExerciseMode>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ExerciseMode::Walking).unwrap();
        assert_eq!(json, "\"walking\"");
    }
}
