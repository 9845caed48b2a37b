//! Spoken pace announcements.
//!
//! On each pace tick the tracker builds an [`Announcement`] from its state and
//! hands it to the [`Announcer`], which renders the text and passes it to a
//! [`SpeechOutput`] (a speech synthesizer, a notification, a log line).
//!
//! At most one announcement is in flight: if the output is still speaking,
//! the new announcement is dropped rather than queued.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::TrackerSettings;
use crate::format::{distance_string, pace_string};
use crate::mode::ExerciseMode;

/// Something that can say a line of text.
///
/// The tracker speaks while holding its state lock, so implementations must
/// not call back into the tracker.
pub trait SpeechOutput: Send + Sync {
    /// Start delivering `text`. Must not block until delivery finishes.
    fn speak(&self, text: &str);

    /// Whether a previous line is still being delivered.
    fn is_speaking(&self) -> bool;
}

/// Periodic progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    /// Current pace in minutes per kilometer, `None` while undefined.
    pub pace_min_per_km: Option<f64>,
    /// Distance covered so far in meters.
    pub distance_m: f64,
    /// Mode that picks the verb.
    pub mode: ExerciseMode,
}

impl Announcement {
    /// Text spoken for this announcement, e.g. `每公里5:30，已跑2.10公里`.
    pub fn text(&self) -> String {
        format!(
            "每公里{}，{}{}",
            pace_string(self.pace_min_per_km),
            self.mode.progress_verb(),
            distance_string(self.distance_m)
        )
    }
}

/// Session start/stop cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCue {
    Started(ExerciseMode),
    Stopped(ExerciseMode),
}

impl LifecycleCue {
    /// Text spoken for this cue.
    pub fn text(&self) -> String {
        match self {
            LifecycleCue::Started(mode) => format!("开始{}追踪", mode.display_name()),
            LifecycleCue::Stopped(mode) => format!("{}结束", mode.display_name()),
        }
    }
}

/// Delivers announcements to a speech output.
#[derive(Clone)]
pub struct Announcer {
    output: Arc<dyn SpeechOutput>,
    enabled: bool,
}

impl std::fmt::Debug for Announcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Announcer")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Announcer {
    /// Create an announcer honoring the voice setting.
    pub fn new(output: Arc<dyn SpeechOutput>, settings: &TrackerSettings) -> Self {
        Self {
            output,
            enabled: settings.voice_announcements,
        }
    }

    /// Whether voice announcements are enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Speak a periodic progress report.
    ///
    /// Returns true if the text was handed to the output.
    pub fn announce(&self, announcement: &Announcement) -> bool {
        self.deliver(&announcement.text())
    }

    /// Speak a start/stop cue.
    pub fn announce_cue(&self, cue: LifecycleCue) -> bool {
        self.deliver(&cue.text())
    }

    fn deliver(&self, text: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if self.output.is_speaking() {
            debug!(text, "Announcement suppressed, previous one still in flight");
            return false;
        }
        self.output.speak(text);
        true
    }
}

/// Speech output that writes each line to the log.
///
/// Never reports itself as speaking.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSpeech;

impl SpeechOutput for TracingSpeech {
    fn speak(&self, text: &str) {
        info!(target: "pacepilot::announce", "{}", text);
    }

    fn is_speaking(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FakeSpeech {
        lines: Mutex<Vec<String>>,
        busy: AtomicBool,
    }

    impl SpeechOutput for FakeSpeech {
        fn speak(&self, text: &str) {
            self.lines.lock().push(text.to_string());
        }

        fn is_speaking(&self) -> bool {
            self.busy.load(Ordering::SeqCst)
        }
    }

    fn announcer(speech: &Arc<FakeSpeech>, enabled: bool) -> Announcer {
        let settings = TrackerSettings::default().with_voice_announcements(enabled);
        Announcer::new(Arc::clone(speech) as Arc<dyn SpeechOutput>, &settings)
    }

    #[test]
    fn test_running_text() {
        let a = Announcement {
            pace_min_per_km: Some(5.5),
            distance_m: 2100.0,
            mode: ExerciseMode::Running,
        };
        assert_eq!(a.text(), "每公里5:30，已跑2.10公里");
    }

    #[test]
    fn test_walking_text_with_undefined_pace() {
        let a = Announcement {
            pace_min_per_km: None,
            distance_m: 0.0,
            mode: ExerciseMode::Walking,
        };
        assert_eq!(a.text(), "每公里--:--，已走0米");
    }

    #[test]
    fn test_cue_text() {
        assert_eq!(LifecycleCue::Started(ExerciseMode::Running).text(), "开始跑步追踪");
        assert_eq!(LifecycleCue::Stopped(ExerciseMode::Walking).text(), "步行结束");
    }

    #[test]
    fn test_announce_delivers() {
        let speech = Arc::new(FakeSpeech::default());
        let announcer = announcer(&speech, true);
        let a = Announcement {
            pace_min_per_km: Some(6.0),
            distance_m: 500.0,
            mode: ExerciseMode::Running,
        };

        assert!(announcer.announce(&a));
        assert_eq!(*speech.lines.lock(), vec!["每公里6:00，已跑500米".to_string()]);
    }

    #[test]
    fn test_in_flight_announcement_suppresses_new_one() {
        let speech = Arc::new(FakeSpeech::default());
        let announcer = announcer(&speech, true);
        let a = Announcement {
            pace_min_per_km: Some(6.0),
            distance_m: 500.0,
            mode: ExerciseMode::Running,
        };

        speech.busy.store(true, Ordering::SeqCst);
        assert!(!announcer.announce(&a));
        assert!(speech.lines.lock().is_empty());

        speech.busy.store(false, Ordering::SeqCst);
        assert!(announcer.announce(&a));
        assert_eq!(speech.lines.lock().len(), 1);
    }

    #[test]
    fn test_disabled_announcer_is_silent() {
        let speech = Arc::new(FakeSpeech::default());
        let announcer = announcer(&speech, false);
        assert!(!announcer.is_enabled());
        assert!(!announcer.announce_cue(LifecycleCue::Started(ExerciseMode::Running)));
        assert!(speech.lines.lock().is_empty());
    }
}
