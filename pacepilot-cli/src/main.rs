//! PacePilot CLI - Command-line interface
//!
//! Replays recorded GPS tracks through the PacePilot tracking core and
//! manages tracker settings.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pacepilot::logging::{init_logging, LoggingConfig};

use commands::common::ModeArg;
use commands::config::ConfigCommands;
use commands::replay::ReplayOptions;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "pacepilot", version, about = "Pace and distance tracking for runs and walks")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON track of position fixes and print the workout
    Replay {
        /// Path to a JSON array of fixes
        track: PathBuf,

        /// Exercise mode for the session
        #[arg(long, value_enum, default_value = "running")]
        mode: ModeArg,

        /// Announcement interval in seconds (overrides the mode default)
        #[arg(long)]
        interval: Option<u64>,

        /// Disable spoken announcements
        #[arg(long)]
        quiet: bool,

        /// Print the workout record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage tracker settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut logging = LoggingConfig::default().with_level(if cli.verbose { "debug" } else { "warn" });
    if let Some(dir) = cli.log_dir {
        logging = logging.with_log_dir(dir);
    }
    let _guard = init_logging(&logging)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Replay {
            track,
            mode,
            interval,
            quiet,
            json,
        } => commands::replay::run(
            ReplayOptions {
                track,
                mode,
                interval_secs: interval,
                quiet,
                json,
            },
            config_path,
        ),
        Commands::Config { command } => commands::config::run(command, config_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_replay_args() {
        let cli = Cli::parse_from([
            "pacepilot",
            "replay",
            "track.json",
            "--mode",
            "walking",
            "--interval",
            "15",
            "--json",
        ]);
        match cli.command {
            Commands::Replay {
                track,
                mode,
                interval,
                quiet,
                json,
            } => {
                assert_eq!(track, PathBuf::from("track.json"));
                assert_eq!(mode, ModeArg::Walking);
                assert_eq!(interval, Some(15));
                assert!(!quiet);
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["pacepilot", "config", "path", "--config", "/tmp/p.ini"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.ini")));
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Path
            }
        ));
    }
}
