//! Command definitions for the Pomobar CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{AudioParams, ConfigParams};

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomobar - a menu bar Pomodoro timer
#[derive(Parser, Debug)]
#[command(
    name = "pomobar",
    version,
    about = "Menu bar Pomodoro timer",
    long_about = "A Pomodoro timer that lives in the menu bar.\n\
                  Run `pomobar daemon` once, then control it from the menu or from this CLI.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path of the daemon's Unix socket
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a new phase or resume a paused one
    Start,

    /// Pause the running phase
    Pause,

    /// Stop the timer and rewind the current phase
    Stop,

    /// Complete the current phase immediately
    Skip,

    /// Go back to the first focus phase and clear the cycle count
    Reset,

    /// Start or pause depending on the current state
    Toggle,

    /// Show current timer status
    Status,

    /// Show or change the timer configuration
    Config(ConfigArgs),

    /// Run the timer daemon with its menu bar icon
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Config Command Arguments
// ============================================================================

/// Arguments for the config command.
///
/// Durations are given in minutes, volumes in percent. Without any option
/// the current configuration is shown.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Focus duration in minutes (1-60)
    #[arg(
        short,
        long,
        value_name = "MINUTES",
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub work: Option<u32>,

    /// Short break duration in minutes (1-60)
    #[arg(
        short,
        long,
        value_name = "MINUTES",
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub short_break: Option<u32>,

    /// Long break duration in minutes (1-60)
    #[arg(
        short,
        long,
        value_name = "MINUTES",
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub long_break: Option<u32>,

    /// Focus phases before a long break (1-10)
    #[arg(
        short,
        long,
        value_name = "COUNT",
        value_parser = clap::value_parser!(u32).range(1..=10)
    )]
    pub cycles: Option<u32>,

    /// Start breaks automatically when a focus phase ends
    #[arg(long, value_name = "BOOL")]
    pub auto_start_breaks: Option<bool>,

    /// Start focus phases automatically when a break ends
    #[arg(long, value_name = "BOOL")]
    pub auto_start_work: Option<bool>,

    /// Show the remaining time next to the menu bar icon
    #[arg(long, value_name = "BOOL")]
    pub show_time: Option<bool>,

    /// Silence every sound
    #[arg(long, value_name = "BOOL")]
    pub mute: Option<bool>,

    /// Play the start and end cues
    #[arg(long, value_name = "BOOL")]
    pub cue_sounds: Option<bool>,

    /// Play the ambient tick while focusing
    #[arg(long, value_name = "BOOL")]
    pub ticking: Option<bool>,

    /// Start cue volume in percent (0-100)
    #[arg(
        long,
        value_name = "PERCENT",
        value_parser = clap::value_parser!(u32).range(0..=100)
    )]
    pub start_volume: Option<u32>,

    /// End cue volume in percent (0-100)
    #[arg(
        long,
        value_name = "PERCENT",
        value_parser = clap::value_parser!(u32).range(0..=100)
    )]
    pub end_volume: Option<u32>,

    /// Ambient tick volume in percent (0-100)
    #[arg(
        long,
        value_name = "PERCENT",
        value_parser = clap::value_parser!(u32).range(0..=100)
    )]
    pub ticking_volume: Option<u32>,
}

impl ConfigArgs {
    /// Returns true if no option was given.
    pub fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }

    /// Converts the arguments to IPC parameters, durations in seconds.
    pub fn to_params(&self) -> ConfigParams {
        ConfigParams {
            work_duration: self.work.map(minutes_to_seconds),
            short_break_duration: self.short_break.map(minutes_to_seconds),
            long_break_duration: self.long_break.map(minutes_to_seconds),
            cycles_before_long_break: self.cycles,
            auto_start_breaks: self.auto_start_breaks,
            auto_start_work: self.auto_start_work,
            show_time_in_menu_bar: self.show_time,
            audio: AudioParams {
                muted: self.mute,
                start_end_sounds: self.cue_sounds,
                ticking: self.ticking,
                start_volume: self.start_volume.map(percent_to_volume),
                end_volume: self.end_volume.map(percent_to_volume),
                ticking_volume: self.ticking_volume.map(percent_to_volume),
            },
        }
    }
}

fn minutes_to_seconds(minutes: u32) -> u32 {
    minutes * 60
}

fn percent_to_volume(percent: u32) -> f32 {
    percent as f32 / 100.0
}

// ============================================================================
// Daemon Command Arguments
// ============================================================================

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonArgs {
    /// Settings file (defaults to pomobar/settings.json in the config directory)
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Disable audio cues
    #[arg(long)]
    pub no_sound: bool,

    /// Disable system notifications
    #[arg(long)]
    pub no_notifications: bool,

    /// Run without the menu bar icon
    #[arg(long)]
    pub no_tray: bool,
}

// ============================================================================
// Tests
// ============================================================================
