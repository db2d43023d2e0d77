//! Display utilities for the Pomobar CLI.
//!
//! This module provides formatted output for:
//! - Command results
//! - Error messages
//! - Status display
//! - Configuration display

use crate::types::{AudioSettings, IpcResponse, ResponseData, TimerConfiguration};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the daemon's message for a timer command.
    pub fn show_action(response: &IpcResponse) {
        for line in Self::action_lines(response) {
            println!("{}", line);
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        for line in Self::status_lines(response) {
            println!("{}", line);
        }
    }

    /// Shows the timer configuration carried by `response`.
    pub fn show_configuration(response: &IpcResponse) {
        let Some(data) = response.data.as_ref() else {
            println!("No configuration received");
            return;
        };
        match data.configuration.as_ref() {
            Some(configuration) => {
                for line in Self::configuration_lines(configuration) {
                    println!("{}", line);
                }
            }
            None => println!("No configuration received"),
        }
        if let Some(audio) = data.audio.as_ref() {
            for line in Self::audio_lines(audio) {
                println!("{}", line);
            }
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn action_lines(response: &IpcResponse) -> Vec<String> {
        let mut lines = vec![format!("✓ {}", response.message)];
        if let Some(data) = &response.data {
            if let Some(remaining) = data.remaining_seconds {
                lines.push(format!(
                    "  {}: {}",
                    phase_label(data),
                    Self::format_time(remaining)
                ));
            }
        }
        lines
    }

    fn status_lines(response: &IpcResponse) -> Vec<String> {
        let mut lines = vec![
            "Pomobar status".to_string(),
            "─────────────────────────────".to_string(),
        ];

        let Some(data) = &response.data else {
            lines.push("No status received".to_string());
            return lines;
        };

        lines.push(format!("Phase:     {}", phase_label(data)));
        lines.push(format!("State:     {}", state_label(data)));
        if let Some(remaining) = data.remaining_seconds {
            lines.push(format!("Remaining: {}", Self::format_time(remaining)));
        }
        if let Some(progress) = data.progress {
            lines.push(format!("Progress:  {:.0}%", progress * 100.0));
        }
        if let Some(cycles) = data.completed_cycles {
            match &data.configuration {
                Some(configuration) => lines.push(format!(
                    "Cycles:    {} / {}",
                    cycles % configuration.cycles_before_long_break.max(1),
                    configuration.cycles_before_long_break
                )),
                None => lines.push(format!("Cycles:    {}", cycles)),
            }
        }
        lines
    }

    fn configuration_lines(configuration: &TimerConfiguration) -> Vec<String> {
        vec![
            format!("Focus:             {} min", configuration.work_duration / 60),
            format!(
                "Short break:       {} min",
                configuration.short_break_duration / 60
            ),
            format!(
                "Long break:        {} min",
                configuration.long_break_duration / 60
            ),
            format!(
                "Long break every:  {} focus phases",
                configuration.cycles_before_long_break
            ),
            format!("Auto-start breaks: {}", on_off(configuration.auto_start_breaks)),
            format!("Auto-start focus:  {}", on_off(configuration.auto_start_work)),
            format!(
                "Time in menu bar:  {}",
                on_off(configuration.show_time_in_menu_bar)
            ),
        ]
    }

    fn audio_lines(audio: &AudioSettings) -> Vec<String> {
        vec![
            format!("Muted:             {}", on_off(audio.muted)),
            format!(
                "Start/end cues:    {} ({} / {})",
                on_off(audio.start_end_sounds),
                percent(audio.start_volume),
                percent(audio.end_volume)
            ),
            format!(
                "Ticking:           {} ({})",
                on_off(audio.ticking),
                percent(audio.ticking_volume)
            ),
        ]
    }

    /// Formats remaining seconds as MM:SS.
    fn format_time(total_seconds: u32) -> String {
        format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

fn percent(volume: f32) -> String {
    format!("{:.0}%", volume * 100.0)
}

fn phase_label(data: &ResponseData) -> &str {
    match data.phase.as_deref() {
        Some("work") => "Focus",
        Some("short_break") => "Short break",
        Some("long_break") => "Long break",
        Some(other) => other,
        None => "unknown",
    }
}

fn state_label(data: &ResponseData) -> &str {
    match data.state.as_deref() {
        Some("idle") => "Ready",
        Some("running") => "Running",
        Some("paused") => "Paused",
        Some("completed") => "Completed",
        Some(other) => other,
        None => "unknown",
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

// ============================================================================
// Tests
// ============================================================================
