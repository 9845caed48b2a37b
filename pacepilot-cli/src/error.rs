//! CLI error types.

use std::fmt;

use pacepilot::config::ConfigError;
use pacepilot::logging::LoggingError;
use pacepilot::TrackerError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Settings could not be read, written, or resolved.
    Config(String),

    /// A track file could not be read.
    Io(std::io::Error),

    /// A track file is not a JSON array of fixes.
    Track(serde_json::Error),

    /// The tracker rejected an operation.
    Tracker(TrackerError),

    /// Logging could not be set up.
    Logging(String),

    /// The replay could not produce a result.
    Replay(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Io(e) => write!(f, "Failed to read track: {}", e),
            CliError::Track(e) => write!(f, "Invalid track file: {}", e),
            CliError::Tracker(e) => write!(f, "Tracker error: {}", e),
            CliError::Logging(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Replay(msg) => write!(f, "Replay failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Track(e) => Some(e),
            CliError::Tracker(e) => Some(e),
            CliError::Config(_) | CliError::Logging(_) | CliError::Replay(_) => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Track(e)
    }
}

impl From<TrackerError> for CliError {
    fn from(e: TrackerError) -> Self {
        CliError::Tracker(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CliError::Config("bad target".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("bad target"));
    }

    #[test]
    fn test_tracker_error_has_source() {
        use std::error::Error;

        let err: CliError = TrackerError::NoScheduler.into();
        assert!(matches!(err, CliError::Tracker(_)));
        assert!(err.source().is_some());
    }
}
