//! JSON file key-value store.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{KeyValueStore, SettingsError};

/// Returns the default settings file path (`<config_dir>/pomobar/settings.json`).
///
/// # Errors
///
/// Returns [`SettingsError::NoConfigDir`] if the platform has no config directory.
pub fn default_settings_path() -> Result<PathBuf, SettingsError> {
    let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
    Ok(dir.join("pomobar").join("settings.json"))
}

/// Key-value store backed by a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the given file. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "settings.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_document(&self) -> Result<Map<String, Value>, SettingsError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => Err(SettingsError::NotAnObject(self.path.clone())),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn read_value(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        let mut document = self.read_document()?;
        Ok(document.remove(key))
    }

    fn write_value(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut document = match self.read_document() {
            Ok(document) => document,
            Err(SettingsError::NotAnObject(path)) => {
                warn!(path = %path.display(), "Replacing settings file that is not a JSON object");
                Map::new()
            }
            Err(e) => return Err(e),
        };
        document.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&Value::Object(document)).map_err(|source| {
            SettingsError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;

        // Written next to the target, then renamed over it.
        let temp_path = self.temp_path();
        fs::write(&temp_path, json).map_err(|source| SettingsError::Write {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), key, "Settings saved");
        Ok(())
    }
}
