//! Tracker error types.

use thiserror::Error;

use crate::location::AuthorizationStatus;
use crate::tracker::SessionState;

/// Errors returned by [`PaceTracker`](crate::tracker::PaceTracker) lifecycle calls.
///
/// Invalid fixes and sessions too short to record are not errors; they are
/// dropped and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// Location authorization has not been granted.
    ///
    /// No state changed. The caller should request authorization and retry.
    #[error("location permission not granted (status: {0})")]
    PermissionDenied(AuthorizationStatus),

    /// The operation is not valid in the current session state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    /// No scheduler was configured and no tokio runtime is available.
    #[error("no scheduler configured and no tokio runtime available")]
    NoScheduler,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_display() {
        let err = TrackerError::PermissionDenied(AuthorizationStatus::Denied);
        assert!(err.to_string().contains("permission"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_transition_display() {
        let err = TrackerError::InvalidTransition {
            operation: "stop",
            state: SessionState::Idle,
        };
        assert_eq!(err.to_string(), "cannot stop while idle");
    }
}
