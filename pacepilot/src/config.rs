//! Tracker settings.
//!
//! Settings are owned by the application (a preferences screen, a config
//! file) and only read by the tracker and the announcer. They live in an INI
//! file:
//!
//! ```text
//! [workout]
//! target_distance_m = 5000
//! preferred_unit = metric
//!
//! [voice]
//! enabled = true
//! interval_secs = 30
//! ```
//!
//! Missing keys fall back to defaults. A zero target or interval also means
//! "use the default", matching how unset preferences read back as zero. The
//! interval may not exceed [`MAX_ANNOUNCEMENT_INTERVAL_SECS`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::mode::ExerciseMode;

/// Default distance goal in meters.
pub const DEFAULT_TARGET_DISTANCE_M: f64 = 5000.0;

/// Longest accepted announcement interval, in seconds.
pub const MAX_ANNOUNCEMENT_INTERVAL_SECS: u64 = 60 * 60;

const SECTION_WORKOUT: &str = "workout";
const SECTION_VOICE: &str = "voice";
const KEY_TARGET: &str = "target_distance_m";
const KEY_UNIT: &str = "preferred_unit";
const KEY_VOICE_ENABLED: &str = "enabled";
const KEY_INTERVAL: &str = "interval_secs";

/// Errors reading or writing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed.
    #[error("failed to load config: {0}")]
    Load(#[from] ini::Error),

    /// The file could not be written.
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),

    /// A key holds a value that cannot be used.
    #[error("invalid value '{value}' for {section}.{key}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

/// Unit preference for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Metric,
    Imperial,
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceUnit::Metric => write!(f, "metric"),
            DistanceUnit::Imperial => write!(f, "imperial"),
        }
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(DistanceUnit::Metric),
            "imperial" => Ok(DistanceUnit::Imperial),
            _ => Err(()),
        }
    }
}

/// Externally sourced settings read by the tracker and announcer.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSettings {
    /// Distance goal in meters.
    pub target_distance_m: f64,

    /// Unit the user prefers to see.
    pub preferred_unit: DistanceUnit,

    /// Whether periodic voice announcements are spoken.
    pub voice_announcements: bool,

    /// Overrides the mode's pace/announcement interval when set.
    pub announcement_interval: Option<Duration>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            target_distance_m: DEFAULT_TARGET_DISTANCE_M,
            preferred_unit: DistanceUnit::Metric,
            voice_announcements: true,
            announcement_interval: None,
        }
    }
}

impl TrackerSettings {
    /// Interval between pace recomputes for the given mode.
    pub fn pace_interval(&self, mode: ExerciseMode) -> Duration {
        self.announcement_interval
            .unwrap_or_else(|| mode.pace_interval())
    }

    /// Set the distance goal.
    pub fn with_target_distance(mut self, meters: f64) -> Self {
        self.target_distance_m = meters;
        self
    }

    /// Enable or disable voice announcements.
    pub fn with_voice_announcements(mut self, enabled: bool) -> Self {
        self.voice_announcements = enabled;
        self
    }

    /// Override the announcement interval, capped at
    /// [`MAX_ANNOUNCEMENT_INTERVAL_SECS`].
    pub fn with_announcement_interval(mut self, interval: Duration) -> Self {
        self.announcement_interval =
            Some(interval.min(Duration::from_secs(MAX_ANNOUNCEMENT_INTERVAL_SECS)));
        self
    }

    /// Load settings from an INI file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path)?;
        Self::from_ini(&ini)
    }

    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Read settings from a parsed INI document.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(raw) = ini.get_from(Some(SECTION_WORKOUT), KEY_TARGET) {
            let target = parse_f64(SECTION_WORKOUT, KEY_TARGET, raw)?;
            if target < 0.0 {
                return Err(invalid(SECTION_WORKOUT, KEY_TARGET, raw));
            }
            if target > 0.0 {
                settings.target_distance_m = target;
            }
        }

        if let Some(raw) = ini.get_from(Some(SECTION_WORKOUT), KEY_UNIT) {
            settings.preferred_unit = raw
                .parse()
                .map_err(|_| invalid(SECTION_WORKOUT, KEY_UNIT, raw))?;
        }

        if let Some(raw) = ini.get_from(Some(SECTION_VOICE), KEY_VOICE_ENABLED) {
            settings.voice_announcements = parse_bool(raw)
                .ok_or_else(|| invalid(SECTION_VOICE, KEY_VOICE_ENABLED, raw))?;
        }

        if let Some(raw) = ini.get_from(Some(SECTION_VOICE), KEY_INTERVAL) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs <= MAX_ANNOUNCEMENT_INTERVAL_SECS)
                .ok_or_else(|| invalid(SECTION_VOICE, KEY_INTERVAL, raw))?;
            if secs > 0 {
                settings.announcement_interval = Some(Duration::from_secs(secs));
            }
        }

        Ok(settings)
    }

    /// Render settings as an INI document.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION_WORKOUT))
            .set(KEY_TARGET, format!("{}", self.target_distance_m))
            .set(KEY_UNIT, self.preferred_unit.to_string());

        let interval = self
            .announcement_interval
            .map(|d| d.as_secs())
            .unwrap_or(0);
        ini.with_section(Some(SECTION_VOICE))
            .set(KEY_VOICE_ENABLED, self.voice_announcements.to_string())
            .set(KEY_INTERVAL, interval.to_string());
        ini
    }

    /// Write settings to an INI file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }
}

/// Default location of the settings file.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pacepilot").join("config.ini"))
}

fn parse_f64(section: &'static str, key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(section, key, raw))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(section: &'static str, key: &'static str, raw: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        value: raw.to_string(),
    }
}
