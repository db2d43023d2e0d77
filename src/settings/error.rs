//! Settings storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing persisted settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file could not be written.
    #[error("Failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings document is not a JSON object.
    #[error("Settings file {0} is not a JSON object")]
    NotAnObject(PathBuf),

    /// A stored value could not be encoded or decoded.
    #[error("Invalid settings value for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The platform has no configuration directory.
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// The in-memory store was told to fail.
    #[error("Settings store unavailable")]
    Unavailable,
}

impl SettingsError {
    /// Returns true if the error came from the filesystem.
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Write { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Read { .. } | Self::Write { .. } => {
                "Check the permissions of the settings directory"
            }
            Self::NotAnObject(_) | Self::Serialization { .. } => {
                "Delete the settings file to restore defaults"
            }
            Self::NoConfigDir => "Pass --settings <path> explicitly",
            Self::Unavailable => "Retry the operation",
        }
    }
}
