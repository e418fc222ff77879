//! Settings persistence layer
//!
//! This module handles loading and saving settings files.

use crate::ExplorerSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Serializable container for settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    /// Version of the settings format (for future migrations)
    pub version: u32,
    /// The settings themselves; missing fields take their defaults
    pub settings: ExplorerSettings,
}

impl SettingsFile {
    /// Current version of the settings format
    pub const CURRENT_VERSION: u32 = 1;

    /// Wraps settings in the current format
    pub fn new(settings: ExplorerSettings) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            settings,
        }
    }
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self::new(ExplorerSettings::default())
    }
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize settings: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize settings: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported settings version: {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes settings to JSON bytes
pub fn serialize_settings(data: &SettingsFile) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(data).map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
}

/// Deserializes settings from JSON bytes
pub fn deserialize_settings(bytes: &[u8]) -> PersistenceResult<SettingsFile> {
    let data: SettingsFile = serde_json::from_slice(bytes)
        .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;

    if data.version != SettingsFile::CURRENT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(data.version));
    }

    Ok(data)
}

/// Attempts to load settings from bytes, falling back to defaults on error
pub fn load_settings_safe(bytes: &[u8]) -> ExplorerSettings {
    match deserialize_settings(bytes) {
        Ok(data) => data.settings,
        Err(e) => {
            warn!(error = %e, "settings unreadable, using defaults");
            ExplorerSettings::default()
        }
    }
}

/// Loads settings from a file
pub async fn load_settings_file(path: &Path) -> PersistenceResult<ExplorerSettings> {
    let bytes = tokio::fs::read(path).await?;
    let data = deserialize_settings(&bytes)?;
    debug!(path = %path.display(), "settings loaded");
    Ok(data.settings)
}

/// Saves settings to a file
pub async fn save_settings_file(settings: &ExplorerSettings, path: &Path) -> PersistenceResult<()> {
    let bytes = serialize_settings(&SettingsFile::new(settings.clone()))?;
    tokio::fs::write(path, bytes).await?;
    debug!(path = %path.display(), "settings saved");
    Ok(())
}
