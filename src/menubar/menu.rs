//! Menu building and item state management for the menu bar.
//!
//! This module decides which menu items are shown and which are enabled for
//! a given engine snapshot. Native menu creation lives in the tray manager.

use crate::types::{TimerPhase, TimerSnapshot, TimerState};

use super::event::MenuItemId;

// ============================================================================
// MenuItemConfig
// ============================================================================

/// Configuration for a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemConfig {
    /// Display text for the menu item
    pub text: String,
    /// Whether the menu item is enabled (clickable)
    pub enabled: bool,
}

impl MenuItemConfig {
    /// Creates a new menu item configuration.
    pub fn new(text: impl Into<String>, enabled: bool) -> Self {
        Self {
            text: text.into(),
            enabled,
        }
    }
}

// ============================================================================
// MenuConfig
// ============================================================================

/// Complete menu configuration for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    /// Title item (always disabled, shows app name)
    pub title: MenuItemConfig,
    /// Status info items (always disabled)
    pub status_items: Vec<MenuItemConfig>,
    /// Start / Pause / Resume
    pub toggle: MenuItemConfig,
    /// Skip the current phase
    pub skip: MenuItemConfig,
    /// Reset to an idle work phase
    pub reset: MenuItemConfig,
    /// Quit button (always enabled)
    pub quit: MenuItemConfig,
}

impl MenuConfig {
    /// Action items with their identifiers, in display order.
    pub fn actions(&self) -> [(MenuItemId, &MenuItemConfig); 4] {
        [
            (MenuItemId::Toggle, &self.toggle),
            (MenuItemId::Skip, &self.skip),
            (MenuItemId::Reset, &self.reset),
            (MenuItemId::Quit, &self.quit),
        ]
    }
}

/// Position of an item in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSlot {
    Title,
    /// Index into the status items
    Status(usize),
    Action(MenuItemId),
}

impl MenuConfig {
    /// Items whose text or enabled state differ from `previous`.
    ///
    /// `None` when the number of status items differs, so the menu has to be
    /// rebuilt rather than updated in place.
    pub fn changes_since<'a>(
        &'a self,
        previous: &MenuConfig,
    ) -> Option<Vec<(MenuSlot, &'a MenuItemConfig)>> {
        if self.status_items.len() != previous.status_items.len() {
            return None;
        }

        let mut changes = Vec::new();
        if self.title != previous.title {
            changes.push((MenuSlot::Title, &self.title));
        }
        for (index, (item, old)) in self
            .status_items
            .iter()
            .zip(&previous.status_items)
            .enumerate()
        {
            if item != old {
                changes.push((MenuSlot::Status(index), item));
            }
        }
        for ((id, item), (_, old)) in self.actions().into_iter().zip(previous.actions()) {
            if item != old {
                changes.push((MenuSlot::Action(id), item));
            }
        }
        Some(changes)
    }
}

// ============================================================================
// MenuBuilder
// ============================================================================

/// Builds menu configuration from engine snapshots.
#[derive(Debug, Default)]
pub struct MenuBuilder;

impl MenuBuilder {
    /// Creates a new MenuBuilder.
    pub fn new() -> Self {
        Self
    }

    /// Builds a complete menu configuration for the snapshot.
    pub fn build(&self, snapshot: &TimerSnapshot) -> MenuConfig {
        MenuConfig {
            title: MenuItemConfig::new("Pomobar", false),
            status_items: self.build_status_items(snapshot),
            toggle: MenuItemConfig::new(Self::toggle_text(snapshot.state), true),
            skip: MenuItemConfig::new("⏭ Skip", Self::is_skip_enabled(snapshot.state)),
            reset: MenuItemConfig::new("↺ Reset", Self::is_reset_enabled(snapshot)),
            quit: MenuItemConfig::new("Quit", true),
        }
    }

    fn build_status_items(&self, snapshot: &TimerSnapshot) -> Vec<MenuItemConfig> {
        vec![
            MenuItemConfig::new(
                format!(
                    "{}: {}",
                    snapshot.phase.display_name(),
                    snapshot.state.display_name()
                ),
                false,
            ),
            MenuItemConfig::new(
                format!("Remaining: {}", snapshot.formatted_time_remaining()),
                false,
            ),
            MenuItemConfig::new(
                format!(
                    "Cycles: {} / {}",
                    snapshot.completed_cycles % snapshot.configuration.cycles_before_long_break.max(1),
                    snapshot.configuration.cycles_before_long_break
                ),
                false,
            ),
        ]
    }

    /// Label of the toggle item for a state.
    pub fn toggle_text(state: TimerState) -> &'static str {
        match state {
            TimerState::Running => "⏸ Pause",
            TimerState::Paused => "▶ Resume",
            TimerState::Idle | TimerState::Completed => "▶ Start",
        }
    }

    /// Skip applies only while running or paused.
    pub fn is_skip_enabled(state: TimerState) -> bool {
        matches!(state, TimerState::Running | TimerState::Paused)
    }

    /// Reset is offered whenever the timer is not at its initial position.
    pub fn is_reset_enabled(snapshot: &TimerSnapshot) -> bool {
        snapshot.state != TimerState::Idle
            || snapshot.phase != TimerPhase::Work
            || snapshot.completed_cycles > 0
    }
}

// ============================================================================
// Tests
// ============================================================================
