//! Demo seed data
//!
//! Sample folders and files for a fresh in-process store, so the explorer
//! has something to browse on first start.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use chrono::Utc;
use fs_view::FolderMarker;
use tracing::{debug, info};

const DEMO_FOLDERS: &[&str] = &["Documents", "Images", "Videos"];

const DEMO_FILES: &[(&str, &str, &[u8])] = &[
    (
        "Documents/example.txt",
        "text/plain",
        b"This is a sample text document",
    ),
    (
        "Documents/data.json",
        "application/json",
        br#"{"title":"Sample data","content":"This is JSON"}"#,
    ),
    ("Images/sample.jpg", "image/jpeg", b"SIMULATED_IMAGE"),
];

/// Seeds a backend with sample content
///
/// Does nothing if the backend already holds any object. Returns the number
/// of objects written.
pub async fn seed_demo_data(backend: &dyn StorageBackend) -> StorageResult<usize> {
    let existing = backend.list_all("", None).await?;
    if !existing.objects.is_empty() {
        debug!(backend = backend.name(), "demo seed skipped, store not empty");
        return Ok(0);
    }

    let mut written = 0;
    let now = Utc::now();

    for folder in DEMO_FOLDERS {
        let marker = FolderMarker::new(folder, now);
        let body = marker
            .to_json()
            .map_err(|e| StorageError::backend("encode", e.to_string()))?;
        backend
            .put(&marker.key(), Bytes::from(body), FolderMarker::CONTENT_TYPE)
            .await?;
        written += 1;
    }

    for (key, content_type, body) in DEMO_FILES {
        backend
            .put(key, Bytes::from_static(*body), content_type)
            .await?;
        written += 1;
    }

    info!(backend = backend.name(), objects = written, "demo data seeded");
    Ok(written)
}
