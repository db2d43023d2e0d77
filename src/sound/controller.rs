//! Owner of the audio settings inside the daemon.

use std::sync::Arc;

use tracing::{info, warn};

use crate::settings::AudioSettingsStore;
use crate::types::{AudioSettings, ConfigError};

use super::SoundPlayer;

/// Holds the current audio settings, persists every change and pushes it
/// to the attached player.
///
/// Works without a player too (sound disabled or no output device), so the
/// settings can still be edited and saved.
pub struct AudioController {
    settings: AudioSettings,
    store: Box<dyn AudioSettingsStore>,
    player: Option<Arc<dyn SoundPlayer>>,
}

impl AudioController {
    /// Loads the stored settings, falling back to the defaults.
    pub fn new(store: Box<dyn AudioSettingsStore>) -> Self {
        let settings = store.load_audio();
        Self {
            settings,
            store,
            player: None,
        }
    }

    /// Attaches the player that receives every later change.
    ///
    /// The current settings are applied to it immediately.
    pub fn attach_player(&mut self, player: Arc<dyn SoundPlayer>) {
        if let Err(e) = player.apply_settings(&self.settings) {
            warn!(error = %e, "Failed to apply audio settings");
        }
        self.player = Some(player);
    }

    /// Current settings.
    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Replaces the settings, saves them and hands them to the player.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range volume; nothing changes then.
    pub fn update(&mut self, settings: AudioSettings) -> Result<(), ConfigError> {
        settings.validate()?;

        self.settings = settings;
        self.store.save_audio(&settings);
        if let Some(player) = &self.player {
            if let Err(e) = player.apply_settings(&settings) {
                warn!(error = %e, "Failed to apply audio settings");
            }
        }

        info!(?settings, "Audio settings updated");
        Ok(())
    }
}

impl std::fmt::Debug for AudioController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioController")
            .field("settings", &self.settings)
            .field("has_player", &self.player.is_some())
            .finish_non_exhaustive()
    }
}
