//! Core data types for the Pomodoro timer.
//!
//! This module defines the data structures used for:
//! - Phase and state enumerations of the timer cycle
//! - Timer configuration with range validation
//! - Audio settings (mute, cue switches, volumes)
//! - Read-only snapshots handed to event listeners
//! - IPC request/response serialization

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// TimerPhase
// ============================================================================

/// One segment of the Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Focused work
    #[default]
    Work,
    /// Short break between work phases
    ShortBreak,
    /// Long break after every N completed work phases
    LongBreak,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Work => "work",
            TimerPhase::ShortBreak => "short_break",
            TimerPhase::LongBreak => "long_break",
        }
    }

    /// Returns a human-readable name for the phase.
    pub fn display_name(&self) -> &'static str {
        match self {
            TimerPhase::Work => "Focus",
            TimerPhase::ShortBreak => "Short break",
            TimerPhase::LongBreak => "Long break",
        }
    }

    /// Returns true for both break phases.
    pub fn is_break(&self) -> bool {
        matches!(self, TimerPhase::ShortBreak | TimerPhase::LongBreak)
    }

    /// Decides which phase follows this one once it completes.
    ///
    /// `completed_cycles` must already include the work phase that just
    /// finished. A long break is due on every positive multiple of
    /// `cycles_before_long_break`, never after the 0th cycle.
    pub fn following(self, completed_cycles: u32, cycles_before_long_break: u32) -> TimerPhase {
        match self {
            TimerPhase::Work => {
                let cadence = cycles_before_long_break.max(1);
                if completed_cycles > 0 && completed_cycles % cadence == 0 {
                    TimerPhase::LongBreak
                } else {
                    TimerPhase::ShortBreak
                }
            }
            TimerPhase::ShortBreak | TimerPhase::LongBreak => TimerPhase::Work,
        }
    }
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Where the engine is in its run lifecycle.
///
/// Never persisted; a fresh process always starts `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    /// Not counting down
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Countdown suspended, remaining time kept
    Paused,
    /// A phase just finished and an automatic start is pending
    Completed,
}

impl TimerState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Completed => "completed",
        }
    }

    /// Returns a human-readable name for the state.
    pub fn display_name(&self) -> &'static str {
        match self {
            TimerState::Idle => "Ready",
            TimerState::Running => "Running",
            TimerState::Paused => "Paused",
            TimerState::Completed => "Completed",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerConfiguration
// ============================================================================

/// Shortest allowed phase, in seconds.
pub const MIN_PHASE_SECONDS: u32 = 60;

/// Longest allowed phase, in seconds.
pub const MAX_PHASE_SECONDS: u32 = 3600;

/// Smallest allowed long-break cadence.
pub const MIN_CYCLES_BEFORE_LONG_BREAK: u32 = 1;

/// Largest allowed long-break cadence.
pub const MAX_CYCLES_BEFORE_LONG_BREAK: u32 = 10;

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("work duration must be {MIN_PHASE_SECONDS}-{MAX_PHASE_SECONDS} seconds (got {0})")]
    WorkDuration(u32),

    #[error("short break duration must be {MIN_PHASE_SECONDS}-{MAX_PHASE_SECONDS} seconds (got {0})")]
    ShortBreakDuration(u32),

    #[error("long break duration must be {MIN_PHASE_SECONDS}-{MAX_PHASE_SECONDS} seconds (got {0})")]
    LongBreakDuration(u32),

    #[error(
        "cycles before long break must be {MIN_CYCLES_BEFORE_LONG_BREAK}-{MAX_CYCLES_BEFORE_LONG_BREAK} (got {0})"
    )]
    CyclesBeforeLongBreak(u32),

    #[error("{0} volume must be between 0.0 and 1.0")]
    Volume(&'static str),
}

/// Durations and auto-chaining policy for the timer.
///
/// A configuration is either fully valid or replaced wholesale by
/// [`TimerConfiguration::default`]; fields are never repaired one by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    /// Work phase length in seconds (60-3600)
    pub work_duration: u32,
    /// Short break length in seconds (60-3600)
    pub short_break_duration: u32,
    /// Long break length in seconds (60-3600)
    pub long_break_duration: u32,
    /// Completed work phases per long break (1-10)
    pub cycles_before_long_break: u32,
    /// Start breaks automatically after a work phase
    pub auto_start_breaks: bool,
    /// Start work automatically after a break
    pub auto_start_work: bool,
    /// Show the countdown next to the menu bar icon
    pub show_time_in_menu_bar: bool,
}

impl Default for TimerConfiguration {
    fn default() -> Self {
        Self {
            work_duration: 25 * 60,
            short_break_duration: 5 * 60,
            long_break_duration: 15 * 60,
            cycles_before_long_break: 4,
            auto_start_breaks: false,
            auto_start_work: false,
            show_time_in_menu_bar: true,
        }
    }
}

impl TimerConfiguration {
    /// Sets the work duration in seconds.
    pub fn with_work_duration(mut self, seconds: u32) -> Self {
        self.work_duration = seconds;
        self
    }

    /// Sets the short break duration in seconds.
    pub fn with_short_break_duration(mut self, seconds: u32) -> Self {
        self.short_break_duration = seconds;
        self
    }

    /// Sets the long break duration in seconds.
    pub fn with_long_break_duration(mut self, seconds: u32) -> Self {
        self.long_break_duration = seconds;
        self
    }

    /// Sets how many work phases run before a long break.
    pub fn with_cycles_before_long_break(mut self, cycles: u32) -> Self {
        self.cycles_before_long_break = cycles;
        self
    }

    /// Sets both auto-start flags.
    pub fn with_auto_start(mut self, breaks: bool, work: bool) -> Self {
        self.auto_start_breaks = breaks;
        self.auto_start_work = work;
        self
    }

    /// Validates every range of the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let phase_range = MIN_PHASE_SECONDS..=MAX_PHASE_SECONDS;
        if !phase_range.contains(&self.work_duration) {
            return Err(ConfigError::WorkDuration(self.work_duration));
        }
        if !phase_range.contains(&self.short_break_duration) {
            return Err(ConfigError::ShortBreakDuration(self.short_break_duration));
        }
        if !phase_range.contains(&self.long_break_duration) {
            return Err(ConfigError::LongBreakDuration(self.long_break_duration));
        }
        if !(MIN_CYCLES_BEFORE_LONG_BREAK..=MAX_CYCLES_BEFORE_LONG_BREAK)
            .contains(&self.cycles_before_long_break)
        {
            return Err(ConfigError::CyclesBeforeLongBreak(
                self.cycles_before_long_break,
            ));
        }
        Ok(())
    }

    /// Returns true if every field is within range.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Returns the configured length of a phase in seconds.
    pub fn phase_seconds(&self, phase: TimerPhase) -> u32 {
        match phase {
            TimerPhase::Work => self.work_duration,
            TimerPhase::ShortBreak => self.short_break_duration,
            TimerPhase::LongBreak => self.long_break_duration,
        }
    }

    /// Returns the configured length of a phase.
    pub fn phase_duration(&self, phase: TimerPhase) -> Duration {
        Duration::from_secs(u64::from(self.phase_seconds(phase)))
    }
}

// ============================================================================
// AudioSettings
// ============================================================================

/// Mute switch, per-sound switches and volumes for the audio cues.
///
/// Like [`TimerConfiguration`], an out-of-range value replaces the whole
/// settings with the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Volume of the work-start cue (0.0-1.0)
    pub start_volume: f32,
    /// Volume of the phase-end cue (0.0-1.0)
    pub end_volume: f32,
    /// Volume of the ambient tick (0.0-1.0)
    pub ticking_volume: f32,
    /// Silences every sound
    pub muted: bool,
    /// Plays the start and end cues
    pub start_end_sounds: bool,
    /// Plays the ambient tick while working
    pub ticking: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            start_volume: 1.0,
            end_volume: 1.0,
            ticking_volume: 0.5,
            muted: false,
            start_end_sounds: true,
            ticking: true,
        }
    }
}

impl AudioSettings {
    /// Validates every volume.
    ///
    /// # Errors
    ///
    /// Returns the first volume outside 0.0-1.0 (NaN included).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let volumes = [
            ("start", self.start_volume),
            ("end", self.end_volume),
            ("ticking", self.ticking_volume),
        ];
        for (name, volume) in volumes {
            if !(0.0..=1.0).contains(&volume) {
                return Err(ConfigError::Volume(name));
            }
        }
        Ok(())
    }

    /// Returns true if every volume is within range.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Volume the start cue plays at; zero when muted or switched off.
    pub fn effective_start_volume(&self) -> f32 {
        self.gated(self.start_end_sounds, self.start_volume)
    }

    /// Volume the end cue plays at; zero when muted or switched off.
    pub fn effective_end_volume(&self) -> f32 {
        self.gated(self.start_end_sounds, self.end_volume)
    }

    /// Volume the ambient tick plays at; zero when muted or switched off.
    pub fn effective_ticking_volume(&self) -> f32 {
        self.gated(self.ticking, self.ticking_volume)
    }

    fn gated(&self, enabled: bool, volume: f32) -> f32 {
        if self.muted || !enabled {
            0.0
        } else {
            volume
        }
    }
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Formats a remaining duration as zero-padded `MM:SS`, floored to whole seconds.
pub fn format_time(remaining: Duration) -> String {
    let total = remaining.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Read-only view of the engine, captured after a mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    /// Current run state
    pub state: TimerState,
    /// Current phase
    pub phase: TimerPhase,
    /// Remaining time in the current phase
    pub time_remaining: Duration,
    /// Work phases completed since the last reset
    pub completed_cycles: u32,
    /// Active configuration
    pub configuration: TimerConfiguration,
}

impl TimerSnapshot {
    /// Returns the full length of the current phase.
    pub fn phase_duration(&self) -> Duration {
        self.configuration.phase_duration(self.phase)
    }

    /// Remaining time floored to whole seconds.
    pub fn remaining_seconds(&self) -> u32 {
        u32::try_from(self.time_remaining.as_secs()).unwrap_or(u32::MAX)
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_time_remaining(&self) -> String {
        format_time(self.time_remaining)
    }

    /// Countdown shown next to the menu bar icon.
    ///
    /// Present only while running with `show_time_in_menu_bar` on.
    pub fn menu_bar_time(&self) -> Option<String> {
        (self.configuration.show_time_in_menu_bar && self.state == TimerState::Running)
            .then(|| self.formatted_time_remaining())
    }

    /// Elapsed fraction of the current phase, from 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        let total = self.phase_duration().as_secs_f64();
        if total <= 0.0 {
            return 0.0;
        }
        (1.0 - self.time_remaining.as_secs_f64() / total).clamp(0.0, 1.0)
    }

    /// The phase that follows the current one when it completes.
    pub fn phase_after_current(&self) -> TimerPhase {
        self.phase.following(
            self.completed_cycles,
            self.configuration.cycles_before_long_break,
        )
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// Partial configuration update sent with the configure command.
///
/// Durations are in seconds. Audio fields travel flattened next to the
/// timer fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigParams {
    #[serde(rename = "workDuration", skip_serializing_if = "Option::is_none")]
    pub work_duration: Option<u32>,
    #[serde(rename = "shortBreakDuration", skip_serializing_if = "Option::is_none")]
    pub short_break_duration: Option<u32>,
    #[serde(rename = "longBreakDuration", skip_serializing_if = "Option::is_none")]
    pub long_break_duration: Option<u32>,
    #[serde(rename = "cyclesBeforeLongBreak", skip_serializing_if = "Option::is_none")]
    pub cycles_before_long_break: Option<u32>,
    #[serde(rename = "autoStartBreaks", skip_serializing_if = "Option::is_none")]
    pub auto_start_breaks: Option<bool>,
    #[serde(rename = "autoStartWork", skip_serializing_if = "Option::is_none")]
    pub auto_start_work: Option<bool>,
    #[serde(rename = "showTimeInMenuBar", skip_serializing_if = "Option::is_none")]
    pub show_time_in_menu_bar: Option<bool>,
    #[serde(flatten)]
    pub audio: AudioParams,
}

impl ConfigParams {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns true if no timer field is set.
    pub fn timer_is_empty(&self) -> bool {
        ConfigParams {
            audio: AudioParams::default(),
            ..self.clone()
        }
        .is_empty()
    }

    /// Overlays the set timer fields onto `base`.
    pub fn apply_to(&self, base: TimerConfiguration) -> TimerConfiguration {
        TimerConfiguration {
            work_duration: self.work_duration.unwrap_or(base.work_duration),
            short_break_duration: self
                .short_break_duration
                .unwrap_or(base.short_break_duration),
            long_break_duration: self
                .long_break_duration
                .unwrap_or(base.long_break_duration),
            cycles_before_long_break: self
                .cycles_before_long_break
                .unwrap_or(base.cycles_before_long_break),
            auto_start_breaks: self.auto_start_breaks.unwrap_or(base.auto_start_breaks),
            auto_start_work: self.auto_start_work.unwrap_or(base.auto_start_work),
            show_time_in_menu_bar: self
                .show_time_in_menu_bar
                .unwrap_or(base.show_time_in_menu_bar),
        }
    }
}

/// Partial audio settings update. Volumes are 0.0-1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(rename = "startEndSounds", skip_serializing_if = "Option::is_none")]
    pub start_end_sounds: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticking: Option<bool>,
    #[serde(rename = "startVolume", skip_serializing_if = "Option::is_none")]
    pub start_volume: Option<f32>,
    #[serde(rename = "endVolume", skip_serializing_if = "Option::is_none")]
    pub end_volume: Option<f32>,
    #[serde(rename = "tickingVolume", skip_serializing_if = "Option::is_none")]
    pub ticking_volume: Option<f32>,
}

impl AudioParams {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlays the set fields onto `base`.
    pub fn apply_to(&self, base: AudioSettings) -> AudioSettings {
        AudioSettings {
            start_volume: self.start_volume.unwrap_or(base.start_volume),
            end_volume: self.end_volume.unwrap_or(base.end_volume),
            ticking_volume: self.ticking_volume.unwrap_or(base.ticking_volume),
            muted: self.muted.unwrap_or(base.muted),
            start_end_sounds: self.start_end_sounds.unwrap_or(base.start_end_sounds),
            ticking: self.ticking.unwrap_or(base.ticking),
        }
    }
}

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start a fresh phase or resume a paused one
    Start,
    /// Pause the running phase
    Pause,
    /// Stop and rewind the current phase
    Stop,
    /// Complete the current phase immediately
    Skip,
    /// Return to the first work phase and clear the cycle count
    Reset,
    /// Start or pause depending on the current state
    Toggle,
    /// Query the current status
    Status,
    /// Replace part of the configuration
    Configure {
        #[serde(flatten)]
        params: ConfigParams,
    },
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    #[serde(rename = "formattedTime", skip_serializing_if = "Option::is_none")]
    pub formatted_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(rename = "completedCycles", skip_serializing_if = "Option::is_none")]
    pub completed_cycles: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<TimerConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioSettings>,
}

impl ResponseData {
    /// Creates response data from an engine snapshot.
    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        Self {
            state: Some(snapshot.state.as_str().to_string()),
            phase: Some(snapshot.phase.as_str().to_string()),
            remaining_seconds: Some(snapshot.remaining_seconds()),
            formatted_time: Some(snapshot.formatted_time_remaining()),
            progress: Some(snapshot.progress()),
            completed_cycles: Some(snapshot.completed_cycles),
            configuration: Some(snapshot.configuration),
            audio: None,
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for success responses.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(phase: TimerPhase, remaining: Duration) -> TimerSnapshot {
        TimerSnapshot {
            state: TimerState::Running,
            phase,
            time_remaining: remaining,
            completed_cycles: 0,
            configuration: TimerConfiguration::default(),
        }
    }

    // ------------------------------------------------------------------------
    // TimerPhase Tests
    // ------------------------------------------------------------------------

    mod timer_phase_tests {
        use super::*;

        #[test]
        fn test_default_is_work() {
            assert_eq!(TimerPhase::default(), TimerPhase::Work);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(TimerPhase::Work.as_str(), "work");
            assert_eq!(TimerPhase::ShortBreak.as_str(), "short_break");
            assert_eq!(TimerPhase::LongBreak.as_str(), "long_break");
        }

        #[test]
        fn test_is_break() {
            assert!(!TimerPhase::Work.is_break());
            assert!(TimerPhase::ShortBreak.is_break());
            assert!(TimerPhase::LongBreak.is_break());
        }

        #[test]
        fn test_serialize_matches_as_str() {
            let json = serde_json::to_string(&TimerPhase::ShortBreak).unwrap();
            assert_eq!(json, "\"short_break\"");
        }

        #[test]
        fn test_following_break_is_always_work() {
            assert_eq!(TimerPhase::ShortBreak.following(3, 4), TimerPhase::Work);
            assert_eq!(TimerPhase::LongBreak.following(4, 4), TimerPhase::Work);
        }

        #[test]
        fn test_following_work_long_break_cadence() {
            for cycles in [1, 2, 3, 5, 6, 7] {
                assert_eq!(
                    TimerPhase::Work.following(cycles, 4),
                    TimerPhase::ShortBreak,
                    "cycle {cycles}"
                );
            }
            for cycles in [4, 8, 12] {
                assert_eq!(
                    TimerPhase::Work.following(cycles, 4),
                    TimerPhase::LongBreak,
                    "cycle {cycles}"
                );
            }
        }

        #[test]
        fn test_following_never_long_after_zero_cycles() {
            assert_eq!(TimerPhase::Work.following(0, 4), TimerPhase::ShortBreak);
            assert_eq!(TimerPhase::Work.following(0, 1), TimerPhase::ShortBreak);
        }

        #[test]
        fn test_following_cadence_of_one() {
            assert_eq!(TimerPhase::Work.following(1, 1), TimerPhase::LongBreak);
            assert_eq!(TimerPhase::Work.following(2, 1), TimerPhase::LongBreak);
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_default_is_idle() {
            assert_eq!(TimerState::default(), TimerState::Idle);
        }

        #[test]
        fn test_display() {
            assert_eq!(TimerState::Completed.to_string(), "completed");
            assert_eq!(TimerState::Paused.display_name(), "Paused");
        }
    }

    // ------------------------------------------------------------------------
    // TimerConfiguration Tests
    // ------------------------------------------------------------------------

    mod timer_configuration_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = TimerConfiguration::default();
            assert_eq!(config.work_duration, 1500);
            assert_eq!(config.short_break_duration, 300);
            assert_eq!(config.long_break_duration, 900);
            assert_eq!(config.cycles_before_long_break, 4);
            assert!(!config.auto_start_breaks);
            assert!(!config.auto_start_work);
            assert!(config.show_time_in_menu_bar);
            assert!(config.is_valid());
        }

        #[test]
        fn test_builder_pattern() {
            let config = TimerConfiguration::default()
                .with_work_duration(1800)
                .with_short_break_duration(600)
                .with_long_break_duration(1200)
                .with_cycles_before_long_break(3)
                .with_auto_start(true, false);

            assert_eq!(config.work_duration, 1800);
            assert_eq!(config.short_break_duration, 600);
            assert_eq!(config.long_break_duration, 1200);
            assert_eq!(config.cycles_before_long_break, 3);
            assert!(config.auto_start_breaks);
            assert!(!config.auto_start_work);
        }

        #[test]
        fn test_validate_boundary_values() {
            let min = TimerConfiguration::default()
                .with_work_duration(60)
                .with_short_break_duration(60)
                .with_long_break_duration(60)
                .with_cycles_before_long_break(1);
            assert!(min.validate().is_ok());

            let max = TimerConfiguration::default()
                .with_work_duration(3600)
                .with_short_break_duration(3600)
                .with_long_break_duration(3600)
                .with_cycles_before_long_break(10);
            assert!(max.validate().is_ok());
        }

        #[test]
        fn test_validate_reports_each_field() {
            let base = TimerConfiguration::default();
            assert_eq!(
                base.with_work_duration(59).validate(),
                Err(ConfigError::WorkDuration(59))
            );
            assert_eq!(
                base.with_short_break_duration(3601).validate(),
                Err(ConfigError::ShortBreakDuration(3601))
            );
            assert_eq!(
                base.with_long_break_duration(0).validate(),
                Err(ConfigError::LongBreakDuration(0))
            );
            assert_eq!(
                base.with_cycles_before_long_break(0).validate(),
                Err(ConfigError::CyclesBeforeLongBreak(0))
            );
            assert_eq!(
                base.with_cycles_before_long_break(11).validate(),
                Err(ConfigError::CyclesBeforeLongBreak(11))
            );
        }

        #[test]
        fn test_phase_duration() {
            let config = TimerConfiguration::default();
            assert_eq!(
                config.phase_duration(TimerPhase::Work),
                Duration::from_secs(1500)
            );
            assert_eq!(
                config.phase_duration(TimerPhase::ShortBreak),
                Duration::from_secs(300)
            );
            assert_eq!(
                config.phase_duration(TimerPhase::LongBreak),
                Duration::from_secs(900)
            );
        }

        #[test]
        fn test_missing_field_is_rejected() {
            let json = r#"{"work_duration":1500,"short_break_duration":300}"#;
            assert!(serde_json::from_str::<TimerConfiguration>(json).is_err());
        }

        #[test]
        fn test_serialize_deserialize() {
            let config = TimerConfiguration::default().with_auto_start(true, true);
            let json = serde_json::to_string(&config).unwrap();
            assert!(json.contains("\"work_duration\":1500"));
            let back: TimerConfiguration = serde_json::from_str(&json).unwrap();
            assert_eq!(back, config);
        }
    }

    // ------------------------------------------------------------------------
    // AudioSettings Tests
    // ------------------------------------------------------------------------

    mod audio_settings_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let audio = AudioSettings::default();
            assert_eq!(audio.start_volume, 1.0);
            assert_eq!(audio.end_volume, 1.0);
            assert_eq!(audio.ticking_volume, 0.5);
            assert!(!audio.muted);
            assert!(audio.start_end_sounds);
            assert!(audio.ticking);
            assert!(audio.is_valid());
        }

        #[test]
        fn test_validate_volume_range() {
            let base = AudioSettings::default();
            let silent = AudioSettings {
                start_volume: 0.0,
                end_volume: 0.0,
                ticking_volume: 0.0,
                ..base
            };
            assert!(silent.is_valid());

            let loud = AudioSettings {
                end_volume: 1.5,
                ..base
            };
            assert_eq!(loud.validate(), Err(ConfigError::Volume("end")));

            let negative = AudioSettings {
                ticking_volume: -0.1,
                ..base
            };
            assert_eq!(negative.validate(), Err(ConfigError::Volume("ticking")));

            let nan = AudioSettings {
                start_volume: f32::NAN,
                ..base
            };
            assert!(!nan.is_valid());
        }

        #[test]
        fn test_mute_silences_everything() {
            let audio = AudioSettings {
                muted: true,
                ..AudioSettings::default()
            };
            assert_eq!(audio.effective_start_volume(), 0.0);
            assert_eq!(audio.effective_end_volume(), 0.0);
            assert_eq!(audio.effective_ticking_volume(), 0.0);
        }

        #[test]
        fn test_disabled_cues_keep_ticking() {
            let audio = AudioSettings {
                start_end_sounds: false,
                ..AudioSettings::default()
            };
            assert_eq!(audio.effective_start_volume(), 0.0);
            assert_eq!(audio.effective_end_volume(), 0.0);
            assert_eq!(audio.effective_ticking_volume(), 0.5);
        }

        #[test]
        fn test_disabled_ticking_keeps_cues() {
            let audio = AudioSettings {
                ticking: false,
                end_volume: 0.3,
                ..AudioSettings::default()
            };
            assert_eq!(audio.effective_ticking_volume(), 0.0);
            assert_eq!(audio.effective_end_volume(), 0.3);
        }
    }

    // ------------------------------------------------------------------------
    // TimerSnapshot Tests
    // ------------------------------------------------------------------------

    mod timer_snapshot_tests {
        use super::*;

        #[test]
        fn test_format_time_floors_fraction() {
            assert_eq!(format_time(Duration::from_millis(1_499_900)), "24:59");
            assert_eq!(format_time(Duration::from_secs(65)), "01:05");
            assert_eq!(format_time(Duration::ZERO), "00:00");
            assert_eq!(format_time(Duration::from_secs(3600)), "60:00");
        }

        #[test]
        fn test_progress() {
            let full = snapshot(TimerPhase::Work, Duration::from_secs(1500));
            assert_eq!(full.progress(), 0.0);

            let half = snapshot(TimerPhase::Work, Duration::from_secs(750));
            assert!((half.progress() - 0.5).abs() < f64::EPSILON);

            let done = snapshot(TimerPhase::ShortBreak, Duration::ZERO);
            assert_eq!(done.progress(), 1.0);
        }

        #[test]
        fn test_remaining_seconds_floors() {
            let snap = snapshot(TimerPhase::Work, Duration::from_millis(299_900));
            assert_eq!(snap.remaining_seconds(), 299);
            assert_eq!(snap.formatted_time_remaining(), "04:59");
        }

        #[test]
        fn test_menu_bar_time() {
            let mut snap = snapshot(TimerPhase::Work, Duration::from_secs(61));
            assert_eq!(snap.menu_bar_time().as_deref(), Some("01:01"));

            snap.state = TimerState::Paused;
            assert_eq!(snap.menu_bar_time(), None);

            snap.state = TimerState::Running;
            snap.configuration.show_time_in_menu_bar = false;
            assert_eq!(snap.menu_bar_time(), None);
        }

        #[test]
        fn test_phase_after_current_uses_completed_cycles() {
            let mut snap = snapshot(TimerPhase::Work, Duration::ZERO);
            snap.completed_cycles = 4;
            assert_eq!(snap.phase_after_current(), TimerPhase::LongBreak);

            snap.completed_cycles = 5;
            assert_eq!(snap.phase_after_current(), TimerPhase::ShortBreak);
        }
    }

    // ------------------------------------------------------------------------
    // IPC Types Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_simple_commands_serialize() {
            let cases = [
                (IpcRequest::Start, r#"{"command":"start"}"#),
                (IpcRequest::Pause, r#"{"command":"pause"}"#),
                (IpcRequest::Stop, r#"{"command":"stop"}"#),
                (IpcRequest::Skip, r#"{"command":"skip"}"#),
                (IpcRequest::Reset, r#"{"command":"reset"}"#),
                (IpcRequest::Toggle, r#"{"command":"toggle"}"#),
                (IpcRequest::Status, r#"{"command":"status"}"#),
            ];

            for (request, expected) in cases {
                assert_eq!(serde_json::to_string(&request).unwrap(), expected);
                let parsed: IpcRequest = serde_json::from_str(expected).unwrap();
                assert_eq!(parsed, request);
            }
        }

        #[test]
        fn test_configure_request_flattens_params() {
            let request = IpcRequest::Configure {
                params: ConfigParams {
                    work_duration: Some(1800),
                    auto_start_breaks: Some(true),
                    ..Default::default()
                },
            };

            let json = serde_json::to_string(&request).unwrap();
            assert!(json.contains("\"command\":\"configure\""));
            assert!(json.contains("\"workDuration\":1800"));
            assert!(json.contains("\"autoStartBreaks\":true"));
            assert!(!json.contains("shortBreakDuration"));
        }

        #[test]
        fn test_configure_request_deserialize() {
            let json = r#"{"command":"configure","cyclesBeforeLongBreak":2}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();

            match request {
                IpcRequest::Configure { params } => {
                    assert_eq!(params.cycles_before_long_break, Some(2));
                    assert!(params.work_duration.is_none());
                }
                _ => panic!("Expected Configure request"),
            }
        }

        #[test]
        fn test_config_params_apply_to() {
            let params = ConfigParams {
                short_break_duration: Some(120),
                show_time_in_menu_bar: Some(false),
                ..Default::default()
            };
            let base = TimerConfiguration::default();
            let merged = params.apply_to(base);

            assert_eq!(merged.work_duration, base.work_duration);
            assert_eq!(merged.short_break_duration, 120);
            assert!(!merged.show_time_in_menu_bar);
            assert!(!params.is_empty());
            assert!(!params.timer_is_empty());
            assert!(ConfigParams::default().is_empty());
        }

        #[test]
        fn test_audio_params_travel_flattened() {
            let json = r#"{"command":"configure","muted":true,"tickingVolume":0.25}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();

            let IpcRequest::Configure { params } = request else {
                panic!("Expected Configure request");
            };
            assert!(params.timer_is_empty());
            assert!(!params.is_empty());
            assert_eq!(params.audio.muted, Some(true));
            assert_eq!(params.audio.ticking_volume, Some(0.25));

            let merged = params.audio.apply_to(AudioSettings::default());
            assert!(merged.muted);
            assert_eq!(merged.ticking_volume, 0.25);
            assert_eq!(merged.start_volume, 1.0);
        }

        #[test]
        fn test_response_data_from_snapshot() {
            let mut snap = snapshot(TimerPhase::ShortBreak, Duration::from_millis(150_500));
            snap.completed_cycles = 3;

            let data = ResponseData::from_snapshot(&snap);
            assert_eq!(data.state.as_deref(), Some("running"));
            assert_eq!(data.phase.as_deref(), Some("short_break"));
            assert_eq!(data.remaining_seconds, Some(150));
            assert_eq!(data.formatted_time.as_deref(), Some("02:30"));
            assert_eq!(data.completed_cycles, Some(3));
            assert_eq!(data.configuration, Some(TimerConfiguration::default()));
        }

        #[test]
        fn test_ipc_response_roundtrip_json_shape() {
            let response = IpcResponse::success("OK", None);
            let json = serde_json::to_string(&response).unwrap();
            assert_eq!(json, r#"{"status":"success","message":"OK"}"#);
            assert!(response.is_success());
            assert!(!IpcResponse::error("nope").is_success());
        }
    }
}
