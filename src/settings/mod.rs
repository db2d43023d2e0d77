//! Persisted settings for the Pomodoro timer.
//!
//! The timer configuration and the audio settings are stored as JSON values
//! under fixed keys in a key-value store. Two stores are provided:
//! - [`JsonFileStore`]: a JSON object on disk, other keys preserved on save
//! - [`MemoryStore`]: an in-process map
//!
//! Any [`KeyValueStore`] is a [`ConfigStore`] and an [`AudioSettingsStore`].
//! Loading never fails: a missing, unreadable or invalid value yields the
//! defaults. Saving an invalid value is a no-op.

mod error;
mod file;
mod memory;

pub use error::SettingsError;
pub use file::{default_settings_path, JsonFileStore};
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{AudioSettings, ConfigError, TimerConfiguration};

/// Key under which the timer configuration is stored.
pub const CONFIGURATION_KEY: &str = "pomobar.timer_configuration";

/// Key under which the audio settings are stored.
pub const AUDIO_SETTINGS_KEY: &str = "pomobar.audio_settings";

// ============================================================================
// Traits
// ============================================================================

/// Raw JSON key-value storage.
pub trait KeyValueStore {
    /// Reads the value stored under `key`, if any.
    fn read_value(&self, key: &str) -> Result<Option<Value>, SettingsError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write_value(&self, key: &str, value: Value) -> Result<(), SettingsError>;
}

/// Load/save capability consumed by the timer engine.
pub trait ConfigStore {
    /// Loads the persisted configuration, or the defaults if absent or invalid.
    fn load(&self) -> TimerConfiguration;

    /// Persists a configuration. Invalid configurations are not written.
    fn save(&self, configuration: &TimerConfiguration);
}

/// Load/save capability consumed by the audio controller.
pub trait AudioSettingsStore {
    /// Loads the persisted audio settings, or the defaults if absent or invalid.
    fn load_audio(&self) -> AudioSettings;

    /// Persists audio settings. Invalid settings are not written.
    fn save_audio(&self, settings: &AudioSettings);
}

impl<T: KeyValueStore> ConfigStore for T {
    fn load(&self) -> TimerConfiguration {
        load_or_default(self, CONFIGURATION_KEY, TimerConfiguration::validate)
    }

    fn save(&self, configuration: &TimerConfiguration) {
        save_if_valid(self, CONFIGURATION_KEY, configuration, TimerConfiguration::validate);
    }
}

impl<T: KeyValueStore> AudioSettingsStore for T {
    fn load_audio(&self) -> AudioSettings {
        load_or_default(self, AUDIO_SETTINGS_KEY, AudioSettings::validate)
    }

    fn save_audio(&self, settings: &AudioSettings) {
        save_if_valid(self, AUDIO_SETTINGS_KEY, settings, AudioSettings::validate);
    }
}

fn load_or_default<S, T>(store: &S, key: &str, validate: fn(&T) -> Result<(), ConfigError>) -> T
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    let value = match store.read_value(key) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!(key, "Nothing stored, using defaults");
            return T::default();
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read settings, using defaults");
            return T::default();
        }
    };

    let loaded: T = match serde_json::from_value(value) {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!(key, error = %e, "Stored settings are malformed, using defaults");
            return T::default();
        }
    };

    if let Err(e) = validate(&loaded) {
        warn!(key, error = %e, "Stored settings are out of range, using defaults");
        return T::default();
    }

    loaded
}

fn save_if_valid<S, T>(store: &S, key: &str, value: &T, validate: fn(&T) -> Result<(), ConfigError>)
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    if let Err(e) = validate(value) {
        debug!(key, error = %e, "Refusing to save invalid settings");
        return;
    }

    let encoded = match serde_json::to_value(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!(key, error = %e, "Failed to encode settings");
            return;
        }
    };

    if let Err(e) = store.write_value(key, encoded) {
        warn!(key, error = %e, "Failed to save settings");
    }
}

// ============================================================================
// Tests
// ============================================================================
