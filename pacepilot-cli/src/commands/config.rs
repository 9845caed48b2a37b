//! Settings management CLI commands.
//!
//! Provides `config path`, `config show` and `config init`.

use std::path::Path;

use clap::Subcommand;
use pacepilot::config::TrackerSettings;
use pacepilot::format::target_string;
use pacepilot::ExerciseMode;

use super::common::{load_settings, resolve_config_path};
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the settings file path
    Path,

    /// Show the effective settings
    Show,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(config_path),
        ConfigCommands::Show => run_show(config_path),
        ConfigCommands::Init { force } => run_init(config_path, force),
    }
}

fn run_path(config_path: Option<&Path>) -> Result<(), CliError> {
    println!("{}", resolve_config_path(config_path)?.display());
    Ok(())
}

fn run_show(config_path: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;

    println!("Tracker Settings");
    println!("================");
    println!();
    println!("[workout]");
    println!(
        "  target_distance_m = {}  ({})",
        settings.target_distance_m,
        target_string(settings.target_distance_m)
    );
    println!("  preferred_unit = {}", settings.preferred_unit);
    println!();
    println!("[voice]");
    println!("  enabled = {}", settings.voice_announcements);
    for mode in ExerciseMode::ALL {
        println!(
            "  {} interval = {}s",
            mode,
            settings.pace_interval(mode).as_secs()
        );
    }

    Ok(())
}

fn run_init(config_path: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = resolve_config_path(config_path)?;
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    TrackerSettings::default().save(&path)?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
