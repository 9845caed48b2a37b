//! PacePilot - pace and distance tracking for runs and walks
//!
//! This library turns a stream of GPS fixes into live distance, elapsed time
//! and average pace, speaks periodic progress reports, and hands a record of
//! each finished workout to the application.
//!
//! ```text
//! LocationProvider ──► LocationStream ──► spawn_fix_pump ──► PaceTracker
//!   (authorization,      (sampling filter)                    │  ▲
//!    sampling config)                                         │  │ ticks
//!                                                             │  Scheduler / Clock
//!                          Announcer ◄── pace tick ───────────┤
//!                          WorkoutSink ◄── stop() ────────────┤
//!                          watch::Receiver<TrackingSnapshot> ◄┘
//! ```

pub mod announcer;
pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod location;
pub mod logging;
pub mod mode;
pub mod scheduler;
pub mod tracker;

pub use announcer::{Announcer, SpeechOutput, TracingSpeech};
pub use config::TrackerSettings;
pub use error::TrackerError;
pub use history::{WorkoutHistory, WorkoutSink};
pub use location::PositionFix;
pub use mode::ExerciseMode;
pub use tracker::{PaceTracker, SessionState, TrackingSnapshot, WorkoutRecord};
