//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use pacepilot::config::{config_file_path, TrackerSettings};
use pacepilot::ExerciseMode;

use crate::error::CliError;

/// Exercise mode selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    /// Running: navigation-grade accuracy, 10 m filter, report every 30 s
    Running,
    /// Walking: best accuracy, 5 m filter, report every 60 s
    Walking,
}

impl From<ModeArg> for ExerciseMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Running => ExerciseMode::Running,
            ModeArg::Walking => ExerciseMode::Walking,
        }
    }
}

/// Resolve the settings file: the CLI path if given, else the default.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Result<PathBuf, CliError> {
    match cli_path {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path().ok_or_else(|| {
            CliError::Config(
                "No configuration directory on this platform. Use --config to pick a file."
                    .to_string(),
            )
        }),
    }
}

/// Load settings from the resolved file, defaulting when it does not exist.
pub fn load_settings(cli_path: Option<&Path>) -> Result<TrackerSettings, CliError> {
    let path = resolve_config_path(cli_path)?;
    Ok(TrackerSettings::load_or_default(&path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_arg_conversion() {
        assert_eq!(ExerciseMode::from(ModeArg::Running), ExerciseMode::Running);
        assert_eq!(ExerciseMode::from(ModeArg::Walking), ExerciseMode::Walking);
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/tmp/custom.ini");
        assert_eq!(resolve_config_path(Some(path)).unwrap(), path);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("absent.ini"))).unwrap();
        assert_eq!(settings, TrackerSettings::default());
    }
}
