//! Replay a recorded track through the tracker.
//!
//! The track is a JSON array of position fixes. Fixes are sorted by time and
//! fed one by one while a manual clock is moved to each fix's timestamp, so
//! elapsed-time ticks, pace recomputes and announcements fire exactly as they
//! would have during the live session.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pacepilot::announcer::{Announcer, SpeechOutput, TracingSpeech};
use pacepilot::config::{TrackerSettings, MAX_ANNOUNCEMENT_INTERVAL_SECS};
use pacepilot::format::{target_progress, target_string};
use pacepilot::history::{WorkoutHistory, WorkoutSink};
use pacepilot::location::{AuthorizationStatus, ChannelLocationProvider, FixFilter, PositionFix};
use pacepilot::scheduler::ManualScheduler;
use pacepilot::{ExerciseMode, PaceTracker, WorkoutRecord};
use tracing::{debug, info};

use super::common::{load_settings, ModeArg};
use crate::error::CliError;

/// Options for `pacepilot replay`.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub track: PathBuf,
    pub mode: ModeArg,
    pub interval_secs: Option<u64>,
    pub quiet: bool,
    pub json: bool,
}

/// Result of replaying one track.
#[derive(Debug)]
pub struct ReplayOutcome {
    pub fixes_read: usize,
    pub fixes_applied: usize,
    pub record: Option<WorkoutRecord>,
}

/// Speech output that prints each line to stdout.
struct ConsoleSpeech;

impl SpeechOutput for ConsoleSpeech {
    fn speak(&self, text: &str) {
        println!("  > {}", text);
    }

    fn is_speaking(&self) -> bool {
        false
    }
}

/// Run the replay command.
pub fn run(options: ReplayOptions, config_path: Option<&Path>) -> Result<(), CliError> {
    let mut settings = load_settings(config_path)?;
    if let Some(secs) = options.interval_secs {
        if secs == 0 || secs > MAX_ANNOUNCEMENT_INTERVAL_SECS {
            return Err(CliError::Config(format!(
                "--interval must be between 1 and {} seconds",
                MAX_ANNOUNCEMENT_INTERVAL_SECS
            )));
        }
        settings = settings.with_announcement_interval(Duration::from_secs(secs));
    }
    if options.quiet {
        settings = settings.with_voice_announcements(false);
    }

    let mode = ExerciseMode::from(options.mode);
    let fixes = read_track(&options.track)?;

    // Keep stdout clean for JSON output
    let speech: Arc<dyn SpeechOutput> = if options.json {
        Arc::new(TracingSpeech)
    } else {
        println!(
            "Replaying {} ({} mode)",
            options.track.display(),
            mode.display_name()
        );
        Arc::new(ConsoleSpeech)
    };

    let outcome = replay_track(fixes, mode, settings.clone(), speech)?;

    if options.json {
        let json = serde_json::to_string_pretty(&outcome.record)
            .map_err(|e| CliError::Replay(format!("failed to encode record: {}", e)))?;
        println!("{}", json);
    } else {
        print_summary(&outcome, &settings);
    }
    Ok(())
}

/// Read a JSON array of fixes.
pub fn read_track(path: &Path) -> Result<Vec<PositionFix>, CliError> {
    let data = std::fs::read_to_string(path)?;
    let fixes: Vec<PositionFix> = serde_json::from_str(&data)?;
    debug!(path = %path.display(), count = fixes.len(), "Track loaded");
    Ok(fixes)
}

/// Feed `fixes` through a fresh tracker and stop it at the last fix.
pub fn replay_track(
    mut fixes: Vec<PositionFix>,
    mode: ExerciseMode,
    settings: TrackerSettings,
    speech: Arc<dyn SpeechOutput>,
) -> Result<ReplayOutcome, CliError> {
    fixes.sort_by_key(|fix| fix.timestamp);
    let started_at = fixes
        .first()
        .map(|fix| fix.timestamp)
        .ok_or_else(|| CliError::Replay("track contains no fixes".to_string()))?;

    let (provider, _stream) = ChannelLocationProvider::new(mode.sampling());
    provider.set_authorization(AuthorizationStatus::AuthorizedWhenInUse);

    let clock = Arc::new(ManualScheduler::new(started_at));
    let history = Arc::new(WorkoutHistory::new());
    let announcer = Announcer::new(speech, &settings);

    let tracker = PaceTracker::builder(Arc::new(provider))
        .manual_clock(clock.clone())
        .announcer(announcer)
        .sink(history.clone() as Arc<dyn WorkoutSink>)
        .settings(settings)
        .mode(mode)
        .build()?;

    tracker.start()?;

    let fixes_read = fixes.len();
    let mut filter = FixFilter::new(mode.sampling());
    let mut fixes_applied = 0;
    for fix in fixes {
        clock.advance_to(fix.timestamp);
        if let Some(fix) = filter.accept(fix) {
            if tracker.on_fix(fix) {
                fixes_applied += 1;
            }
        }
    }

    let record = tracker.stop()?;
    info!(
        fixes_read,
        fixes_applied,
        recorded = record.is_some(),
        "Replay finished"
    );

    Ok(ReplayOutcome {
        fixes_read,
        fixes_applied,
        record,
    })
}

fn print_summary(outcome: &ReplayOutcome, settings: &TrackerSettings) {
    println!();
    println!(
        "Replayed {} fixes ({} applied)",
        outcome.fixes_read, outcome.fixes_applied
    );
    println!();

    let Some(record) = &outcome.record else {
        println!("Session too short to record (no distance or no duration).");
        return;
    };

    println!("Workout");
    println!("=======");
    println!("  Mode:      {}", record.mode().display_name());
    println!("  Distance:  {}", record.distance_string());
    println!("  Duration:  {}", record.duration_string());
    println!("  Pace:      {} /km", record.pace_string());
    println!(
        "  {}  ({:.0}%)",
        target_string(settings.target_distance_m),
        target_progress(record.distance_m(), settings.target_distance_m) * 100.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingSpeech {
        lines: Mutex<Vec<String>>,
    }

    impl SpeechOutput for CollectingSpeech {
        fn speak(&self, text: &str) {
            self.lines.lock().unwrap().push(text.to_string());
        }

        fn is_speaking(&self) -> bool {
            false
        }
    }

    fn fix_at(secs: i64, lon: f64) -> PositionFix {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap();
        PositionFix::new(0.0, lon, start + chrono::Duration::seconds(secs), 5.0)
    }

    #[test]
    fn test_replay_records_workout() {
        // Out of order on purpose
        let fixes = vec![fix_at(360, 0.0108), fix_at(0, 0.0), fix_at(180, 0.0054)];
        let speech = Arc::new(CollectingSpeech::default());

        let outcome = replay_track(
            fixes,
            ExerciseMode::Running,
            TrackerSettings::default(),
            speech.clone(),
        )
        .unwrap();

        assert_eq!(outcome.fixes_read, 3);
        assert_eq!(outcome.fixes_applied, 3);
        let record = outcome.record.unwrap();
        assert_eq!(record.duration_seconds(), 360.0);
        assert!((record.average_pace_min_per_km() - 5.0).abs() < 0.01);

        let lines = speech.lines.lock().unwrap();
        assert_eq!(lines.first().map(String::as_str), Some("开始跑步追踪"));
        assert_eq!(lines.last().map(String::as_str), Some("跑步结束"));
        // Start cue, twelve 30 s reports, stop cue
        assert_eq!(lines.len(), 14);
    }

    #[test]
    fn test_replay_applies_distance_filter() {
        // Second fix is about 3 m from the first: below the 5 m walking filter
        let fixes = vec![fix_at(0, 0.0), fix_at(10, 0.00003), fix_at(60, 0.001)];
        let outcome = replay_track(
            fixes,
            ExerciseMode::Walking,
            TrackerSettings::default().with_voice_announcements(false),
            Arc::new(TracingSpeech),
        )
        .unwrap();

        assert_eq!(outcome.fixes_applied, 2);
        assert!(outcome.record.is_some());
    }

    #[test]
    fn test_single_fix_is_not_recorded() {
        let outcome = replay_track(
            vec![fix_at(0, 0.0)],
            ExerciseMode::Running,
            TrackerSettings::default(),
            Arc::new(TracingSpeech),
        )
        .unwrap();
        assert!(outcome.record.is_none());
    }

    #[test]
    fn test_empty_track_is_an_error() {
        let result = replay_track(
            Vec::new(),
            ExerciseMode::Running,
            TrackerSettings::default(),
            Arc::new(TracingSpeech),
        );
        assert!(matches!(result, Err(CliError::Replay(_))));
    }

    #[test]
    fn test_out_of_range_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let track = dir.path().join("track.json");
        std::fs::write(&track, serde_json::to_string(&vec![fix_at(0, 0.0)]).unwrap()).unwrap();
        let config = dir.path().join("config.ini");

        for secs in [0, 100_000_000_000_000] {
            let options = ReplayOptions {
                track: track.clone(),
                mode: ModeArg::Running,
                interval_secs: Some(secs),
                quiet: true,
                json: true,
            };
            assert!(matches!(
                run(options, Some(&config)),
                Err(CliError::Config(_))
            ));
        }
    }

    #[test]
    fn test_read_track_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.json");
        let fixes = vec![fix_at(0, 0.0), fix_at(60, 0.002)];
        std::fs::write(&path, serde_json::to_string(&fixes).unwrap()).unwrap();

        assert_eq!(read_track(&path).unwrap(), fixes);
    }

    #[test]
    fn test_read_track_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.json");
        std::fs::write(&path, "{\"not\": \"a track\"}").unwrap();

        assert!(matches!(read_track(&path), Err(CliError::Track(_))));
        assert!(matches!(
            read_track(&dir.path().join("missing.json")),
            Err(CliError::Io(_))
        ));
    }
}
