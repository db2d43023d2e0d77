//! Keeps the menu bar display in step with the engine.

use crate::daemon::event::{ListenerError, TimerEvent, TimerListener};
use crate::types::TimerSnapshot;

use super::icon::IconManager;
use super::menu::{MenuBuilder, MenuConfig};
use super::DisplaySink;

/// Refreshes title and menu on ticks, state changes and configuration changes.
///
/// Unchanged titles and menus are not re-sent.
pub struct DisplayListener<D: DisplaySink> {
    sink: D,
    icon_manager: IconManager,
    menu_builder: MenuBuilder,
    last_title: Option<String>,
    last_menu: Option<MenuConfig>,
}

impl<D: DisplaySink> DisplayListener<D> {
    pub fn new(sink: D) -> Self {
        Self {
            sink,
            icon_manager: IconManager::new(),
            menu_builder: MenuBuilder::new(),
            last_title: None,
            last_menu: None,
        }
    }

    /// Pushes the title and menu for `snapshot` if either changed.
    pub fn refresh(&mut self, snapshot: &TimerSnapshot) -> Result<(), ListenerError> {
        let title = self.icon_manager.generate_title(snapshot);
        if self.last_title.as_deref() != Some(title.as_str()) {
            self.sink.set_text(&title)?;
            self.last_title = Some(title);
        }

        let menu = self.menu_builder.build(snapshot);
        if self.last_menu.as_ref() != Some(&menu) {
            self.sink.set_menu(&menu)?;
            self.last_menu = Some(menu);
        }
        Ok(())
    }
}

impl<D: DisplaySink> TimerListener for DisplayListener<D> {
    fn name(&self) -> &'static str {
        "display"
    }

    fn on_event(&mut self, event: &TimerEvent, snapshot: &TimerSnapshot) -> Result<(), ListenerError> {
        match event {
            TimerEvent::Tick { .. }
            | TimerEvent::StateChanged { .. }
            | TimerEvent::ConfigurationChanged => self.refresh(snapshot),
            _ => Ok(()),
        }
    }
}
