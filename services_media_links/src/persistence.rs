//! Link table persistence
//!
//! This module handles loading and saving the link table as versioned JSON.

use crate::table::LinkTable;
use fs_view::YoutubeLink;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Serializable container for links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinksData {
    /// Version of the file format (for future migrations)
    pub version: u32,
    /// Links ordered by file path
    pub links: Vec<YoutubeLink>,
}

impl LinksData {
    /// Current version of the file format
    pub const CURRENT_VERSION: u32 = 1;

    /// Captures a table
    pub fn from_table(table: &LinkTable) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            links: table.all().into_iter().cloned().collect(),
        }
    }

    /// Rebuilds a table
    pub fn into_table(self) -> LinkTable {
        LinkTable::from_links(self.links)
    }
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize links: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize links: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported links version: {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes links to JSON bytes
pub fn serialize_links(data: &LinksData) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(data).map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
}

/// Deserializes links from JSON bytes
pub fn deserialize_links(bytes: &[u8]) -> PersistenceResult<LinksData> {
    let data: LinksData = serde_json::from_slice(bytes)
        .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;

    if data.version != LinksData::CURRENT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(data.version));
    }

    Ok(data)
}

/// Loads a table from a file; a missing file is an empty table
pub async fn load_links(path: &Path) -> PersistenceResult<LinkTable> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let table = deserialize_links(&bytes)?.into_table();
            debug!(path = %path.display(), links = table.len(), "links loaded");
            Ok(table)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LinkTable::new()),
        Err(e) => Err(e.into()),
    }
}

/// Saves a table to a file
pub async fn save_links(table: &LinkTable, path: &Path) -> PersistenceResult<()> {
    let bytes = serialize_links(&LinksData::from_table(table))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;
    debug!(path = %path.display(), links = table.len(), "links saved");
    Ok(())
}
