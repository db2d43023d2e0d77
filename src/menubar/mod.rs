//! Menu bar display for the Pomodoro timer.
//!
//! This module provides:
//! - Title text generation (e.g., "🍅 15:30")
//! - Menu model with toggle/skip/reset/quit actions
//! - [`DisplayListener`], which keeps the display in step with the engine
//! - [`TrayIconManager`], the tray icon itself (macOS only)
//!
//! # Architecture
//!
//! - `icon.rs`: Title text generation (platform-independent, fully testable)
//! - `menu.rs`: Menu configuration (platform-independent, fully testable)
//! - `event.rs`: Actions, item ids and tray updates (platform-independent)
//! - `listener.rs`: Event listener feeding a [`DisplaySink`]
//! - `mod.rs`: TrayIconManager (platform-specific on macOS)
//!
//! The listener sends [`TrayUpdate`]s over a crossbeam channel; the daemon
//! drains them into the tray manager on the main thread.

pub mod event;
pub mod icon;
mod listener;
pub mod menu;

pub use event::{EventHandler, MenuAction, MenuItemId, TrayUpdate};
pub use icon::IconManager;
pub use listener::DisplayListener;
pub use menu::{MenuBuilder, MenuConfig, MenuItemConfig, MenuSlot};

use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::daemon::event::ListenerError;

// ============================================================================
// DisplaySink
// ============================================================================

/// Destination for the displayed text and menu.
pub trait DisplaySink {
    /// Replaces the displayed title.
    fn set_text(&mut self, text: &str) -> Result<(), ListenerError>;

    /// Replaces the menu. Sinks without a menu ignore it.
    fn set_menu(&mut self, _menu: &MenuConfig) -> Result<(), ListenerError> {
        Ok(())
    }
}

impl DisplaySink for Sender<TrayUpdate> {
    fn set_text(&mut self, text: &str) -> Result<(), ListenerError> {
        self.send(TrayUpdate::SetTitle(text.to_string()))
            .map_err(|_| ListenerError::Display("tray update channel closed".to_string()))
    }

    fn set_menu(&mut self, menu: &MenuConfig) -> Result<(), ListenerError> {
        self.send(TrayUpdate::SetMenu(menu.clone()))
            .map_err(|_| ListenerError::Display("tray update channel closed".to_string()))
    }
}

/// Display sink that records everything it is given, for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    titles: Arc<Mutex<Vec<String>>>,
    menus: Arc<Mutex<Vec<MenuConfig>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().unwrap().clone()
    }

    pub fn menus(&self) -> Vec<MenuConfig> {
        self.menus.lock().unwrap().clone()
    }

    pub fn last_title(&self) -> Option<String> {
        self.titles.lock().unwrap().last().cloned()
    }
}

impl DisplaySink for RecordingDisplay {
    fn set_text(&mut self, text: &str) -> Result<(), ListenerError> {
        self.titles.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn set_menu(&mut self, menu: &MenuConfig) -> Result<(), ListenerError> {
        self.menus.lock().unwrap().push(menu.clone());
        Ok(())
    }
}

// ============================================================================
// TrayIconManager
// ============================================================================

/// Manages the tray icon and menu bar UI.
///
/// On macOS it owns the actual tray-icon instance. On other platforms it
/// keeps the latest title and menu and does nothing else.
///
/// Menu updates change the existing items in place. The native menu is only
/// rebuilt when its layout changes.
pub struct TrayIconManager {
    /// Event handler for menu clicks
    event_handler: EventHandler,
    /// Channel for receiving updates from the display listener
    update_rx: Receiver<TrayUpdate>,
    /// Whether the manager is initialized
    initialized: bool,
    title: String,
    menu: Option<MenuConfig>,
    menu_rebuilds: usize,
    /// Platform-specific tray icon instance (macOS only)
    #[cfg(target_os = "macos")]
    tray_icon: Option<tray_icon::TrayIcon>,
    /// Handles to the items of the shown menu (macOS only)
    #[cfg(target_os = "macos")]
    native_menu: Option<NativeMenu>,
}

impl TrayIconManager {
    /// Creates a new TrayIconManager.
    ///
    /// On macOS the tray icon is not created until `initialize()` is called.
    pub fn new(update_rx: Receiver<TrayUpdate>) -> Self {
        Self {
            event_handler: EventHandler::new(),
            update_rx,
            initialized: false,
            title: String::new(),
            menu: None,
            menu_rebuilds: 0,
            #[cfg(target_os = "macos")]
            tray_icon: None,
            #[cfg(target_os = "macos")]
            native_menu: None,
        }
    }

    /// Returns whether the manager is initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Title currently shown.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Menu currently shown.
    pub fn menu(&self) -> Option<&MenuConfig> {
        self.menu.as_ref()
    }

    /// How many times the menu was built from scratch.
    pub fn menu_rebuilds(&self) -> usize {
        self.menu_rebuilds
    }

    /// Returns a reference to the event handler.
    pub fn event_handler(&self) -> &EventHandler {
        &self.event_handler
    }

    /// Applies every pending update. Returns how many were applied.
    pub fn process_pending_updates(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.update_rx.try_recv() {
                Ok(update) => {
                    self.handle_update(update);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("Menu bar update channel disconnected");
                    break;
                }
            }
        }
        applied
    }

    fn handle_update(&mut self, update: TrayUpdate) {
        match update {
            TrayUpdate::SetTitle(title) => {
                tracing::debug!(title = %title, "Menu bar title updated");
                #[cfg(target_os = "macos")]
                if let Some(ref tray_icon) = self.tray_icon {
                    tray_icon.set_title(Some(&title));
                }
                self.title = title;
            }
            TrayUpdate::SetMenu(menu) => {
                let changes = self
                    .menu
                    .as_ref()
                    .and_then(|previous| menu.changes_since(previous));
                match changes {
                    Some(changes) => {
                        #[cfg(target_os = "macos")]
                        if let Some(ref native) = self.native_menu {
                            native.apply(&changes);
                        }
                        #[cfg(not(target_os = "macos"))]
                        let _ = changes;
                    }
                    None => {
                        self.menu_rebuilds += 1;
                        #[cfg(target_os = "macos")]
                        self.rebuild_native_menu(&menu);
                    }
                }
                self.menu = Some(menu);
            }
            TrayUpdate::Shutdown => {
                tracing::info!("Shutting down menu bar");
                self.shutdown();
            }
        }
    }

    /// Returns the next menu action clicked by the user, if any.
    #[cfg(target_os = "macos")]
    pub fn poll_action(&self) -> Option<MenuAction> {
        use tray_icon::menu::MenuEvent;

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            let item = MenuItemId::from_id(&event.id.0);
            if let Some(action) = self.event_handler.handle_click(item) {
                return Some(action);
            }
        }
        None
    }

    /// Returns the next menu action clicked by the user, if any.
    #[cfg(not(target_os = "macos"))]
    pub fn poll_action(&self) -> Option<MenuAction> {
        None
    }

    /// Shuts down the tray icon.
    pub fn shutdown(&mut self) {
        self.initialized = false;
        #[cfg(target_os = "macos")]
        {
            self.tray_icon = None;
            self.native_menu = None;
        }
    }

    #[cfg(target_os = "macos")]
    fn rebuild_native_menu(&mut self, menu: &MenuConfig) {
        let Some(ref tray_icon) = self.tray_icon else {
            return;
        };
        match NativeMenu::build(menu) {
            Ok(native) => {
                tray_icon.set_menu(Some(Box::new(native.menu.clone())));
                self.native_menu = Some(native);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to rebuild menu"),
        }
    }

    /// Creates the tray icon (macOS only).
    ///
    /// This must be called from the main thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the tray icon cannot be created.
    #[cfg(target_os = "macos")]
    pub fn initialize(&mut self, title: &str, menu: &MenuConfig) -> anyhow::Result<()> {
        use anyhow::Context;
        use tray_icon::TrayIconBuilder;

        let native = NativeMenu::build(menu)?;

        let tray_icon = TrayIconBuilder::new()
            .with_title(title)
            .with_menu(Box::new(native.menu.clone()))
            .with_tooltip("Pomobar")
            .build()
            .context("Failed to create tray icon")?;

        self.tray_icon = Some(tray_icon);
        self.native_menu = Some(native);
        self.title = title.to_string();
        self.menu = Some(menu.clone());
        self.initialized = true;

        tracing::info!("Menu bar icon initialized");
        Ok(())
    }

    /// Initializes the tray icon (non-macOS, no-op).
    #[cfg(not(target_os = "macos"))]
    pub fn initialize(&mut self, title: &str, menu: &MenuConfig) -> anyhow::Result<()> {
        tracing::info!("Menu bar is only supported on macOS; display updates are logged");
        self.title = title.to_string();
        self.menu = Some(menu.clone());
        self.initialized = true;
        Ok(())
    }
}

/// A native menu together with handles to its items (macOS only).
#[cfg(target_os = "macos")]
struct NativeMenu {
    menu: tray_icon::menu::Menu,
    title: tray_icon::menu::MenuItem,
    status: Vec<tray_icon::menu::MenuItem>,
    actions: Vec<(MenuItemId, tray_icon::menu::MenuItem)>,
}

#[cfg(target_os = "macos")]
impl NativeMenu {
    fn build(config: &MenuConfig) -> anyhow::Result<Self> {
        use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem};

        let menu = Menu::new();

        let title = MenuItem::new(&config.title.text, false, None);
        menu.append(&title)?;
        menu.append(&PredefinedMenuItem::separator())?;

        let mut status = Vec::with_capacity(config.status_items.len());
        for item in &config.status_items {
            let native = MenuItem::new(&item.text, false, None);
            menu.append(&native)?;
            status.push(native);
        }

        menu.append(&PredefinedMenuItem::separator())?;

        let mut actions = Vec::new();
        for (id, item) in config.actions() {
            if id == MenuItemId::Quit {
                menu.append(&PredefinedMenuItem::separator())?;
            }
            let native = MenuItem::with_id(id.as_str(), &item.text, item.enabled, None);
            menu.append(&native)?;
            actions.push((id, native));
        }

        Ok(Self {
            menu,
            title,
            status,
            actions,
        })
    }

    fn apply(&self, changes: &[(MenuSlot, &MenuItemConfig)]) {
        for (slot, item) in changes {
            let native = match slot {
                MenuSlot::Title => Some(&self.title),
                MenuSlot::Status(index) => self.status.get(*index),
                MenuSlot::Action(id) => self
                    .actions
                    .iter()
                    .find(|(action, _)| action == id)
                    .map(|(_, native)| native),
            };
            if let Some(native) = native {
                native.set_text(&item.text);
                native.set_enabled(item.enabled);
            }
        }
    }
}

impl std::fmt::Debug for TrayIconManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrayIconManager")
            .field("initialized", &self.initialized)
            .field("title", &self.title)
            .field("event_handler", &self.event_handler)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    use crate::types::{TimerConfiguration, TimerPhase, TimerSnapshot, TimerState};

    fn idle_menu() -> MenuConfig {
        MenuBuilder::new().build(&TimerSnapshot {
            state: TimerState::Idle,
            phase: TimerPhase::Work,
            time_remaining: Duration::from_secs(1500),
            completed_cycles: 0,
            configuration: TimerConfiguration::default(),
        })
    }

    mod sink_tests {
        use super::*;

        #[test]
        fn test_sender_sink_forwards_updates() {
            let (mut tx, rx) = unbounded::<TrayUpdate>();
            tx.set_text("🍅 24:59").unwrap();
            tx.set_menu(&idle_menu()).unwrap();

            assert!(matches!(rx.try_recv(), Ok(TrayUpdate::SetTitle(t)) if t == "🍅 24:59"));
            assert!(matches!(rx.try_recv(), Ok(TrayUpdate::SetMenu(_))));
        }

        #[test]
        fn test_sender_sink_reports_closed_channel() {
            let (mut tx, rx) = unbounded::<TrayUpdate>();
            drop(rx);

            assert!(matches!(
                tx.set_text("🍅"),
                Err(ListenerError::Display(_))
            ));
        }

        #[test]
        fn test_recording_display() {
            let mut display = RecordingDisplay::new();
            let observer = display.clone();
            display.set_text("🍅").unwrap();
            display.set_menu(&idle_menu()).unwrap();

            assert_eq!(observer.titles(), vec!["🍅"]);
            assert_eq!(observer.last_title().as_deref(), Some("🍅"));
            assert_eq!(observer.menus().len(), 1);
        }
    }

    mod manager_tests {
        use super::*;

        #[test]
        fn test_new() {
            let (_, rx) = unbounded();
            let manager = TrayIconManager::new(rx);

            assert!(!manager.is_initialized());
            assert!(manager.menu().is_none());
        }

        #[test]
        fn test_process_pending_updates() {
            let (tx, rx) = unbounded();
            let mut manager = TrayIconManager::new(rx);

            tx.send(TrayUpdate::SetTitle("🍅 15:30".to_string())).unwrap();
            tx.send(TrayUpdate::SetMenu(idle_menu())).unwrap();

            assert_eq!(manager.process_pending_updates(), 2);
            assert_eq!(manager.title(), "🍅 15:30");
            assert_eq!(manager.menu(), Some(&idle_menu()));
            assert_eq!(manager.process_pending_updates(), 0);
        }

        #[test]
        fn test_countdown_updates_menu_in_place() {
            let (tx, rx) = unbounded();
            let mut manager = TrayIconManager::new(rx);
            let builder = MenuBuilder::new();

            for remaining in (1490..1500).rev() {
                tx.send(TrayUpdate::SetMenu(builder.build(&TimerSnapshot {
                    state: TimerState::Running,
                    phase: TimerPhase::Work,
                    time_remaining: Duration::from_secs(remaining),
                    completed_cycles: 0,
                    configuration: TimerConfiguration::default(),
                })))
                .unwrap();
            }
            manager.process_pending_updates();

            assert_eq!(manager.menu_rebuilds(), 1);
            assert_eq!(
                manager.menu().unwrap().status_items[1].text,
                "Remaining: 24:50"
            );
        }

        #[test]
        fn test_layout_change_rebuilds_menu() {
            let (tx, rx) = unbounded();
            let mut manager = TrayIconManager::new(rx);
            let mut shorter = idle_menu();
            shorter.status_items.pop();

            tx.send(TrayUpdate::SetMenu(idle_menu())).unwrap();
            tx.send(TrayUpdate::SetMenu(shorter)).unwrap();
            tx.send(TrayUpdate::SetMenu(idle_menu())).unwrap();
            manager.process_pending_updates();

            assert_eq!(manager.menu_rebuilds(), 3);
        }

        #[test]
        fn test_shutdown_update() {
            let (tx, rx) = unbounded();
            let mut manager = TrayIconManager::new(rx);
            manager.initialized = true;

            tx.send(TrayUpdate::Shutdown).unwrap();
            manager.process_pending_updates();

            assert!(!manager.is_initialized());
        }

        #[test]
        fn test_disconnected_channel() {
            let (tx, rx) = unbounded::<TrayUpdate>();
            let mut manager = TrayIconManager::new(rx);
            drop(tx);

            assert_eq!(manager.process_pending_updates(), 0);
        }

        #[test]
        fn test_debug() {
            let (_, rx) = unbounded();
            let manager = TrayIconManager::new(rx);

            let debug = format!("{:?}", manager);
            assert!(debug.contains("TrayIconManager"));
            assert!(debug.contains("initialized"));
        }
    }

    #[cfg(not(target_os = "macos"))]
    mod non_macos_tests {
        use super::*;

        #[test]
        fn test_initialize_non_macos() {
            let (_, rx) = unbounded();
            let mut manager = TrayIconManager::new(rx);

            assert!(manager.initialize("🍅", &idle_menu()).is_ok());
            assert!(manager.is_initialized());
            assert_eq!(manager.title(), "🍅");
            assert_eq!(manager.poll_action(), None);
        }
    }
}
