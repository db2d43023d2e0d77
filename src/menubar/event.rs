//! Event handling for menu bar interactions.
//!
//! The event types and action mapping are platform-independent. Native
//! menu events are translated to [`MenuItemId`]s by the tray manager.

use std::fmt;

use super::menu::MenuConfig;

// ============================================================================
// MenuAction
// ============================================================================

/// Actions that can be triggered from the menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start, pause or resume depending on the state
    Toggle,
    /// Complete the current phase now
    Skip,
    /// Return to an idle work phase
    Reset,
    /// Quit the daemon
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_command())
    }
}

impl MenuAction {
    /// Returns the IPC command name for this action.
    pub fn as_command(&self) -> &'static str {
        match self {
            MenuAction::Toggle => "toggle",
            MenuAction::Skip => "skip",
            MenuAction::Reset => "reset",
            MenuAction::Quit => "quit",
        }
    }
}

// ============================================================================
// MenuItemId
// ============================================================================

/// Identifiers for menu items.
///
/// On macOS these strings are the tray-icon menu ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    Toggle,
    Skip,
    Reset,
    Quit,
    /// Unknown or unhandled menu item
    Unknown,
}

impl MenuItemId {
    /// Native id string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuItemId::Toggle => "pomobar.toggle",
            MenuItemId::Skip => "pomobar.skip",
            MenuItemId::Reset => "pomobar.reset",
            MenuItemId::Quit => "pomobar.quit",
            MenuItemId::Unknown => "",
        }
    }

    /// Parses a native id string. Status and title items map to `Unknown`.
    pub fn from_id(id: &str) -> Self {
        [
            MenuItemId::Toggle,
            MenuItemId::Skip,
            MenuItemId::Reset,
            MenuItemId::Quit,
        ]
        .into_iter()
        .find(|item| item.as_str() == id)
        .unwrap_or(MenuItemId::Unknown)
    }

    /// Converts a menu item ID to the corresponding action.
    pub fn to_action(&self) -> Option<MenuAction> {
        match self {
            MenuItemId::Toggle => Some(MenuAction::Toggle),
            MenuItemId::Skip => Some(MenuAction::Skip),
            MenuItemId::Reset => Some(MenuAction::Reset),
            MenuItemId::Quit => Some(MenuAction::Quit),
            MenuItemId::Unknown => None,
        }
    }
}

// ============================================================================
// EventHandler
// ============================================================================

/// Converts menu clicks to actions.
#[derive(Debug, Default)]
pub struct EventHandler;

impl EventHandler {
    /// Creates a new EventHandler.
    pub fn new() -> Self {
        Self
    }

    /// Processes a menu item click and returns the corresponding action.
    pub fn handle_click(&self, item_id: MenuItemId) -> Option<MenuAction> {
        let action = item_id.to_action();

        if let Some(ref action) = action {
            tracing::info!(action = %action, "Menu action received");
        }

        action
    }

    /// Logs whether the engine applied an action.
    pub fn log_action_result(&self, action: &MenuAction, applied: bool) {
        if applied {
            tracing::debug!(action = %action, "Menu action applied");
        } else {
            tracing::debug!(action = %action, "Menu action had no effect");
        }
    }
}

// ============================================================================
// TrayUpdate
// ============================================================================

/// Updates sent to the tray icon over a crossbeam channel.
#[derive(Debug, Clone)]
pub enum TrayUpdate {
    /// Update the title text displayed in the menu bar
    SetTitle(String),
    /// Replace the menu
    SetMenu(MenuConfig),
    /// Shutdown the tray icon
    Shutdown,
}

// ============================================================================
// Tests
// ============================================================================
