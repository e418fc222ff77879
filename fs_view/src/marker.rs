//! Folder marker body
//!
//! The object at `<folder>/.folder` carries a small JSON descriptor. Only its
//! presence matters for listings; the body is informational.

use crate::path::PathNormalizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON descriptor stored in a folder marker object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderMarker {
    /// Folder name
    pub name: String,
    /// Always `"folder"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Folder display path (`/Docs/`)
    pub path: String,
    /// Always true
    pub is_folder: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl FolderMarker {
    /// Content type used when writing marker objects
    pub const CONTENT_TYPE: &'static str = "application/json";

    /// Creates a marker descriptor for a folder path
    pub fn new(path: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            name: PathNormalizer::basename(path).to_string(),
            kind: "folder".to_string(),
            path: PathNormalizer::folder_display_path(path),
            is_folder: true,
            created_at,
        }
    }

    /// Backend key the marker is stored under
    pub fn key(&self) -> String {
        PathNormalizer::marker_key(&self.path)
    }

    /// Serializes the descriptor
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses a marker body
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
