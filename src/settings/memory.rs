//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{KeyValueStore, SettingsError};

/// Key-value store held in memory.
///
/// Clones share the same map, so a test can keep a handle after moving the
/// store into an engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every read and write fail with [`SettingsError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), SettingsError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(SettingsError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn read_value(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        self.check()?;
        let values = self.values.lock().map_err(|_| SettingsError::Unavailable)?;
        Ok(values.get(key).cloned())
    }

    fn write_value(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.check()?;
        let mut values = self.values.lock().map_err(|_| SettingsError::Unavailable)?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}
