//! Local directory object store
//!
//! Maps each key to a file under a root directory, so `Docs/a.txt` lives at
//! `<root>/Docs/a.txt`. Directories are an artifact of the mapping and are
//! pruned when they become empty. Content types are not stored.

use crate::backend::{paginate, ListPage, ListRequest, ObjectData, ObjectSummary, PutReceipt, StorageBackend};
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Object store backed by a directory tree
#[derive(Debug, Clone)]
pub struct LocalDirBackend {
    root: PathBuf,
}

impl LocalDirBackend {
    /// Opens a store rooted at `root`, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::from_io(&root.display().to_string(), e))?;
        Ok(Self { root })
    }

    /// Returns the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a key to a file path, rejecting keys that would escape the root
    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::backend("invalid_key", "empty key"));
        }

        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(StorageError::backend(
                    "invalid_key",
                    format!("unsupported key: {}", key),
                ));
            }
            path.push(segment);
        }
        Ok(path)
    }

    /// Removes empty directories from `start` up to (not including) the root
    async fn prune_empty_dirs(&self, start: Option<&Path>) {
        let mut current = start.map(Path::to_path_buf);
        while let Some(dir) = current {
            if dir == self.root || !dir.starts_with(&self.root) {
                break;
            }
            // remove_dir fails on non-empty directories, which ends the walk
            if tokio::fs::remove_dir(&dir).await.is_err() {
                break;
            }
            current = dir.parent().map(Path::to_path_buf);
        }
    }
}

fn walk_error(error: walkdir::Error) -> StorageError {
    let path = error
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    StorageError::backend("walk", format!("{}: {}", path, error))
}

// Any unreadable entry fails the whole listing
fn walk_objects(root: &Path, base: &Path) -> StorageResult<Vec<ObjectSummary>> {
    let mut objects = Vec::new();

    for entry in WalkDir::new(base).follow_links(false) {
        let entry = entry.map_err(walk_error)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let segments: Option<Vec<&str>> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect();
        let key = match segments {
            Some(segments) => segments.join("/"),
            None => continue,
        };

        let meta = entry.metadata().map_err(walk_error)?;
        let last_modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .and_then(|d| DateTime::<Utc>::from_timestamp(d.as_secs() as i64, d.subsec_nanos()));

        objects.push(ObjectSummary {
            key,
            size: meta.len(),
            last_modified,
            content_type: None,
        });
    }

    objects.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(objects)
}

#[async_trait]
impl StorageBackend for LocalDirBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn list(&self, request: &ListRequest) -> StorageResult<ListPage> {
        // Walk only the deepest directory the prefix pins down
        let base = match request.prefix.rfind('/') {
            Some(idx) => self.resolve(&request.prefix[..idx])?,
            None => self.root.clone(),
        };
        if !tokio::fs::try_exists(&base).await.unwrap_or(false) {
            return Ok(ListPage::default());
        }

        let root = self.root.clone();
        let objects = tokio::task::spawn_blocking(move || walk_objects(&root, &base))
            .await
            .map_err(|e| StorageError::backend("join", e.to_string()))??;

        Ok(paginate(objects, request))
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectData> {
        let path = self.resolve(key)?;
        let body = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::from_io(key, e))?;

        Ok(ObjectData {
            body: Bytes::from(body),
            content_type: None,
        })
    }

    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> StorageResult<PutReceipt> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::from_io(key, e))?;
        }

        let size = body.len() as u64;
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| StorageError::from_io(key, e))?;

        Ok(PutReceipt {
            key: key.to_string(),
            size,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::from_io(key, e))?;

        self.prune_empty_dirs(path.parent()).await;
        Ok(())
    }
}
