//! Title generation for the menu bar.
//!
//! The text generation logic is platform-independent and fully testable.

use crate::types::{TimerPhase, TimerSnapshot};

// ============================================================================
// Constants
// ============================================================================

/// Emoji for a work phase
const WORK_EMOJI: &str = "🍅";

/// Emoji for a short break
const SHORT_BREAK_EMOJI: &str = "☕";

/// Emoji for a long break
const LONG_BREAK_EMOJI: &str = "🌴";

// ============================================================================
// IconManager
// ============================================================================

/// Generates the menu bar title from engine snapshots.
#[derive(Debug, Default)]
pub struct IconManager;

impl IconManager {
    /// Creates a new IconManager.
    pub fn new() -> Self {
        Self
    }

    /// Generates the title text for display in the menu bar.
    ///
    /// Format:
    /// - Running with `show_time_in_menu_bar`: `"🍅 MM:SS"`
    /// - Otherwise: the phase emoji alone
    pub fn generate_title(&self, snapshot: &TimerSnapshot) -> String {
        let emoji = self.emoji(snapshot.phase);
        match snapshot.menu_bar_time() {
            Some(time) => format!("{} {}", emoji, time),
            None => emoji.to_string(),
        }
    }

    /// Returns the emoji for a phase.
    pub fn emoji(&self, phase: TimerPhase) -> &'static str {
        match phase {
            TimerPhase::Work => WORK_EMOJI,
            TimerPhase::ShortBreak => SHORT_BREAK_EMOJI,
            TimerPhase::LongBreak => LONG_BREAK_EMOJI,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
