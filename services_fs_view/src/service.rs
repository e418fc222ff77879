//! File operation engine
//!
//! Every mutation is decomposed into `list`, `get`, `put` and `delete` calls
//! against the backend. The engine holds no state of its own besides its
//! configuration; callers refresh their listings after each call.

use crate::operations::{
    DeleteReport, EngineConfig, FolderStrategy, KeyFailure, OpStage, OperationError,
    PartialFailure, RejectedUpload, StageTracker, TransferOutcome, UploadReport, UploadRequest,
};
use bytes::Bytes;
use chrono::Utc;
use fs_view::{mime_for_name, Entry, FileEntry, FolderEntry, FolderMarker, PathNormalizer, MARKER_NAME};
use futures::future::join_all;
use identity::AccessGate;
use services_storage::{ListRequest, ObjectData, StorageBackend, StorageError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The file operation engine
///
/// Mutating operations take the caller's access gate and fail with
/// `PermissionDenied` before touching the backend if it says no.
#[derive(Clone)]
pub struct FileOperationEngine {
    backend: Arc<dyn StorageBackend>,
    config: EngineConfig,
}

impl FileOperationEngine {
    /// Creates an engine with the default configuration
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            config: EngineConfig::default(),
        }
    }

    /// Replaces the configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the backend
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    fn authorize(gate: &dyn AccessGate, operation: &str) -> Result<(), OperationError> {
        if gate.is_admin() {
            Ok(())
        } else {
            warn!(operation, "permission denied");
            Err(OperationError::PermissionDenied(operation.to_string()))
        }
    }

    fn check_folder_name(name: &str) -> Result<(), OperationError> {
        if PathNormalizer::is_valid_name(name) {
            Ok(())
        } else {
            Err(OperationError::InvalidName(name.to_string()))
        }
    }

    fn check_path(path: &str) -> Result<(), OperationError> {
        if PathNormalizer::is_addressable(path) {
            Ok(())
        } else {
            Err(OperationError::InvalidTarget(format!(
                "{}: `.` and `..` are not allowed in paths",
                path
            )))
        }
    }

    // File names ending in `.folder` would be hidden as markers
    fn check_file_name(name: &str) -> Result<(), OperationError> {
        if PathNormalizer::is_valid_name(name) && !PathNormalizer::is_marker_key(name) {
            Ok(())
        } else {
            Err(OperationError::InvalidName(name.to_string()))
        }
    }

    async fn write_marker(&self, path: &str) -> Result<FolderEntry, StorageError> {
        let marker = FolderMarker::new(path, Utc::now());
        let body = marker
            .to_json()
            .map_err(|e| StorageError::backend("encode", e.to_string()))?;
        self.backend
            .put(&marker.key(), Bytes::from(body), FolderMarker::CONTENT_TYPE)
            .await?;
        Ok(FolderEntry::from_path(path))
    }

    /// Creates an empty folder by writing its marker
    pub async fn create_folder(
        &self,
        gate: &dyn AccessGate,
        parent: &str,
        name: &str,
    ) -> Result<FolderEntry, OperationError> {
        Self::authorize(gate, "create folder")?;
        Self::check_path(parent)?;
        Self::check_folder_name(name)?;

        let path = PathNormalizer::join(parent, name);
        let folder = self.write_marker(&path).await?;
        info!(path = %folder.path, "folder created");
        Ok(folder)
    }

    /// Uploads one file, replacing any object at the same path
    pub async fn upload_file(
        &self,
        gate: &dyn AccessGate,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<FileEntry, OperationError> {
        Self::authorize(gate, "upload")?;
        self.put_file(path, body, content_type).await
    }

    /// Uploads a batch into one directory
    ///
    /// Oversized files are reported without a backend call; the rest are
    /// written concurrently and succeed or fail independently.
    pub async fn upload_batch(
        &self,
        gate: &dyn AccessGate,
        directory: &str,
        requests: Vec<UploadRequest>,
    ) -> Result<UploadReport, OperationError> {
        Self::authorize(gate, "upload")?;
        Self::check_path(directory)?;

        let limit = self.config.max_upload_bytes;
        let mut report = UploadReport::default();
        let mut pending = Vec::new();

        for request in requests {
            let path = PathNormalizer::join(directory, &request.name);
            let size = request.body.len() as u64;
            if size > limit {
                report.too_large.push(RejectedUpload { path, size, limit });
            } else {
                pending.push((path, request));
            }
        }

        let results = join_all(
            pending
                .iter()
                .map(|(path, request)| self.put_file(path, request.body.clone(), &request.content_type)),
        )
        .await;

        for ((path, _), result) in pending.iter().zip(results) {
            match result {
                Ok(file) => report.uploaded.push(file),
                Err(err) => report.failed.push((path.clone(), err)),
            }
        }

        if report.is_complete() {
            info!(directory, uploaded = report.uploaded.len(), "upload batch finished");
        } else {
            warn!(
                directory,
                uploaded = report.uploaded.len(),
                too_large = report.too_large.len(),
                failed = report.failed.len(),
                "upload batch finished with rejections"
            );
        }
        Ok(report)
    }

    async fn put_file(
        &self,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<FileEntry, OperationError> {
        Self::check_path(path)?;
        let key = PathNormalizer::normalize(path);
        let name = PathNormalizer::basename(&key);
        Self::check_file_name(name)?;

        let size = body.len() as u64;
        let limit = self.config.max_upload_bytes;
        if size > limit {
            return Err(OperationError::TooLarge {
                path: PathNormalizer::display_path(&key),
                size,
                limit,
            });
        }

        let content_type = if content_type.is_empty() {
            mime_for_name(name).to_string()
        } else {
            content_type.to_string()
        };

        let receipt = self.backend.put(&key, body, &content_type).await?;
        debug!(key = %key, size = receipt.size, "file uploaded");

        Ok(FileEntry::from_key(&key)
            .with_mime_type(content_type)
            .with_size(receipt.size)
            .with_last_modified(Some(Utc::now())))
    }

    /// Downloads a file; open to every caller
    pub async fn download_file(&self, path: &str) -> Result<ObjectData, OperationError> {
        let key = PathNormalizer::normalize(path);
        if key.is_empty() {
            return Err(OperationError::NotFound("/".to_string()));
        }
        Ok(self.backend.get(&key).await?)
    }

    /// Deletes a file, or a folder with everything under it
    pub async fn delete_item(
        &self,
        gate: &dyn AccessGate,
        entry: &Entry,
    ) -> Result<DeleteReport, OperationError> {
        Self::authorize(gate, "delete")?;

        if entry.is_folder() {
            self.delete_folder(entry.path()).await
        } else {
            self.delete_file(Self::object_key(entry)).await
        }
    }

    /// The key a listed file lives at; folders and bare paths normalize
    fn object_key(entry: &Entry) -> String {
        match entry {
            Entry::File(file) if !file.backend_key.is_empty() => file.backend_key.clone(),
            _ => PathNormalizer::normalize(entry.path()),
        }
    }

    async fn delete_file(&self, key: String) -> Result<DeleteReport, OperationError> {
        if PathNormalizer::is_root(&key) {
            return Err(OperationError::InvalidTarget("/".to_string()));
        }

        self.backend.delete(&key).await?;
        info!(key = %key, "file deleted");

        Ok(DeleteReport {
            path: PathNormalizer::display_path(&key),
            deleted: vec![key],
        })
    }

    /// Enumerates every descendant key, deletes them all concurrently and
    /// waits for each call to settle before reporting
    async fn delete_folder(&self, path: &str) -> Result<DeleteReport, OperationError> {
        if PathNormalizer::is_root(path) {
            return Err(OperationError::InvalidTarget(
                "the root folder cannot be deleted".to_string(),
            ));
        }

        let folder_path = PathNormalizer::folder_display_path(path);
        let prefix = PathNormalizer::folder_prefix(path);
        let keys = self.backend.list_all(&prefix, None).await?.keys();
        if keys.is_empty() {
            return Err(OperationError::NotFound(folder_path));
        }

        let results = join_all(keys.iter().map(|key| self.backend.delete(key))).await;

        let mut completed = Vec::new();
        let mut failures = Vec::new();
        for (key, result) in keys.iter().zip(results) {
            match result {
                // Already gone counts as deleted
                Ok(()) => completed.push(key.clone()),
                Err(error) if error.is_not_found() => completed.push(key.clone()),
                Err(error) => failures.push(KeyFailure {
                    key: key.clone(),
                    stage: OpStage::Finalizing,
                    error,
                }),
            }
        }

        if !failures.is_empty() {
            warn!(
                path = %folder_path,
                attempted = keys.len(),
                failed = failures.len(),
                "folder delete incomplete"
            );
            return Err(OperationError::PartialFailure(PartialFailure {
                operation: "delete".to_string(),
                attempted: keys.len(),
                completed,
                completed_stages: Vec::new(),
                failures,
            }));
        }

        info!(path = %folder_path, keys = completed.len(), "folder deleted");
        Ok(DeleteReport {
            path: folder_path,
            deleted: completed,
        })
    }

    /// Renames a file: download, upload under the new name, delete the old one
    pub async fn rename_file(
        &self,
        gate: &dyn AccessGate,
        path: &str,
        new_name: &str,
    ) -> Result<TransferOutcome, OperationError> {
        self.rename_item(gate, &Entry::file(path), new_name).await
    }

    /// Renames a file or folder in place
    ///
    /// Files are read from the key they were listed under.
    pub async fn rename_item(
        &self,
        gate: &dyn AccessGate,
        entry: &Entry,
        new_name: &str,
    ) -> Result<TransferOutcome, OperationError> {
        if entry.is_folder() {
            return self.rename_folder(gate, entry.path(), new_name).await;
        }

        Self::authorize(gate, "rename")?;
        Self::check_path(entry.path())?;
        Self::check_file_name(new_name)?;

        let source = Self::object_key(entry);
        if PathNormalizer::is_root(&source) {
            return Err(OperationError::InvalidTarget("/".to_string()));
        }
        let destination = PathNormalizer::normalize(&PathNormalizer::join(
            &PathNormalizer::parent(entry.path()),
            new_name,
        ));

        self.transfer_file("rename", &source, &destination, true).await
    }

    /// Renames a folder according to the configured folder strategy
    pub async fn rename_folder(
        &self,
        gate: &dyn AccessGate,
        path: &str,
        new_name: &str,
    ) -> Result<TransferOutcome, OperationError> {
        Self::authorize(gate, "rename")?;
        Self::check_path(path)?;
        Self::check_folder_name(new_name)?;

        if PathNormalizer::is_root(path) {
            return Err(OperationError::InvalidTarget(
                "the root folder cannot be renamed".to_string(),
            ));
        }
        let destination = PathNormalizer::join(&PathNormalizer::parent(path), new_name);

        self.transfer_folder("rename", path, &destination, true).await
    }

    /// Copies an entry into another folder; the source is left in place
    pub async fn copy_item(
        &self,
        gate: &dyn AccessGate,
        entry: &Entry,
        destination_parent: &str,
    ) -> Result<TransferOutcome, OperationError> {
        Self::authorize(gate, "copy")?;
        self.transfer_entry("copy", entry, destination_parent, false)
            .await
    }

    /// Moves an entry into another folder: copy, then delete the source
    pub async fn move_item(
        &self,
        gate: &dyn AccessGate,
        entry: &Entry,
        destination_parent: &str,
    ) -> Result<TransferOutcome, OperationError> {
        Self::authorize(gate, "move")?;
        self.transfer_entry("move", entry, destination_parent, true)
            .await
    }

    async fn transfer_entry(
        &self,
        operation: &str,
        entry: &Entry,
        destination_parent: &str,
        delete_source: bool,
    ) -> Result<TransferOutcome, OperationError> {
        Self::check_path(destination_parent)?;
        if PathNormalizer::is_root(entry.path()) {
            return Err(OperationError::InvalidTarget(format!(
                "cannot {} the root folder",
                operation
            )));
        }
        let destination = PathNormalizer::join(destination_parent, entry.name());

        if entry.is_folder() {
            self.transfer_folder(operation, entry.path(), &destination, delete_source)
                .await
        } else {
            self.transfer_file(
                operation,
                &Self::object_key(entry),
                &PathNormalizer::normalize(&destination),
                delete_source,
            )
            .await
        }
    }

    /// Moves one object through `Reading → Writing → Finalizing`
    ///
    /// A failure before the write leaves the store untouched. A failed
    /// delete after a successful write leaves both copies and is reported
    /// as a partial failure.
    async fn transfer_file(
        &self,
        operation: &str,
        source: &str,
        destination: &str,
        delete_source: bool,
    ) -> Result<TransferOutcome, OperationError> {
        if source == destination {
            return Ok(TransferOutcome::Unchanged {
                path: PathNormalizer::display_path(source),
            });
        }

        let mut tracker = StageTracker::new();

        tracker.enter(OpStage::Reading);
        let data = self.backend.get(source).await?;
        tracker.complete();

        tracker.enter(OpStage::Writing);
        let content_type = data
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| mime_for_name(destination).to_string());
        self.backend.put(destination, data.body, &content_type).await?;
        tracker.complete();

        if delete_source {
            tracker.enter(OpStage::Finalizing);
            if let Err(error) = self.backend.delete(source).await {
                tracker.finish(true);
                warn!(
                    operation,
                    source,
                    destination,
                    error = %error,
                    "source delete failed, both copies remain"
                );
                return Err(OperationError::PartialFailure(PartialFailure {
                    operation: operation.to_string(),
                    attempted: 1,
                    completed: Vec::new(),
                    completed_stages: tracker.completed().to_vec(),
                    failures: vec![KeyFailure {
                        key: source.to_string(),
                        stage: OpStage::Finalizing,
                        error,
                    }],
                }));
            }
            tracker.complete();
        }

        tracker.finish(false);
        info!(operation, source, destination, "file transferred");
        Ok(TransferOutcome::Completed {
            source: PathNormalizer::display_path(source),
            destination: PathNormalizer::display_path(destination),
            keys: vec![source.to_string()],
        })
    }

    async fn transfer_folder(
        &self,
        operation: &str,
        source: &str,
        destination: &str,
        delete_source: bool,
    ) -> Result<TransferOutcome, OperationError> {
        let source_display = PathNormalizer::folder_display_path(source);
        if PathNormalizer::normalize(source) == PathNormalizer::normalize(destination) {
            return Ok(TransferOutcome::Unchanged {
                path: source_display,
            });
        }
        if PathNormalizer::is_within(source, destination) {
            return Err(OperationError::InvalidTarget(format!(
                "cannot {} {} into itself",
                operation, source_display
            )));
        }

        match self.config.folder_strategy {
            FolderStrategy::MarkerOnly => {
                let probe = ListRequest::new(PathNormalizer::folder_prefix(source)).with_max_keys(1);
                if self.backend.list(&probe).await?.is_empty() {
                    return Err(OperationError::NotFound(source_display));
                }

                let created = self.write_marker(destination).await?;
                info!(
                    operation,
                    source = %source_display,
                    created = %created.path,
                    "folder marker written, contents left in place"
                );
                Ok(TransferOutcome::ManualCompletionRequired {
                    source: source_display,
                    created,
                })
            }
            FolderStrategy::Recursive => {
                self.transfer_tree(operation, source, destination, delete_source)
                    .await
            }
        }
    }

    /// Copies every descendant concurrently, writes a fresh marker, then
    /// deletes the sources whose copy succeeded
    async fn transfer_tree(
        &self,
        operation: &str,
        source: &str,
        destination: &str,
        delete_source: bool,
    ) -> Result<TransferOutcome, OperationError> {
        let source_display = PathNormalizer::folder_display_path(source);
        let source_prefix = PathNormalizer::folder_prefix(source);
        let destination_prefix = PathNormalizer::folder_prefix(destination);
        let own_marker = format!("{}{}", source_prefix, MARKER_NAME);

        let keys = self.backend.list_all(&source_prefix, None).await?.keys();
        if keys.is_empty() {
            return Err(OperationError::NotFound(source_display));
        }

        let pairs: Vec<(String, String)> = keys
            .iter()
            .filter(|key| **key != own_marker)
            .filter_map(|key| {
                PathNormalizer::rebase(key, &source_prefix, &destination_prefix)
                    .map(|target| (key.clone(), target))
            })
            .collect();

        let results = join_all(
            pairs
                .iter()
                .map(|(from, to)| self.copy_object(from, to)),
        )
        .await;

        let mut copied = Vec::new();
        let mut failures = Vec::new();
        for ((from, _), result) in pairs.iter().zip(results) {
            match result {
                Ok(()) => copied.push(from.clone()),
                Err(failure) => failures.push(failure),
            }
        }

        let marker_written = match self.write_marker(destination).await {
            Ok(_) => true,
            Err(error) => {
                failures.push(KeyFailure {
                    key: PathNormalizer::marker_key(destination),
                    stage: OpStage::Writing,
                    error,
                });
                false
            }
        };

        let completed = if delete_source {
            let mut doomed = copied.clone();
            // The old marker goes only once the new one exists
            if marker_written && keys.contains(&own_marker) {
                doomed.push(own_marker.clone());
            }

            let deletes = join_all(doomed.iter().map(|key| self.backend.delete(key))).await;
            let mut deleted = Vec::new();
            for (key, result) in doomed.iter().zip(deletes) {
                match result {
                    Ok(()) => deleted.push(key.clone()),
                    Err(error) if error.is_not_found() => deleted.push(key.clone()),
                    Err(error) => failures.push(KeyFailure {
                        key: key.clone(),
                        stage: OpStage::Finalizing,
                        error,
                    }),
                }
            }
            deleted.retain(|key| *key != own_marker);
            deleted
        } else {
            copied
        };

        if !failures.is_empty() {
            warn!(
                operation,
                source = %source_display,
                attempted = keys.len(),
                failed = failures.len(),
                "folder transfer incomplete"
            );
            return Err(OperationError::PartialFailure(PartialFailure {
                operation: operation.to_string(),
                attempted: keys.len(),
                completed,
                completed_stages: Vec::new(),
                failures,
            }));
        }

        let destination_display = PathNormalizer::folder_display_path(destination);
        info!(
            operation,
            source = %source_display,
            destination = %destination_display,
            keys = completed.len(),
            "folder transferred"
        );
        Ok(TransferOutcome::Completed {
            source: source_display,
            destination: destination_display,
            keys: completed,
        })
    }

    async fn copy_object(&self, source: &str, destination: &str) -> Result<(), KeyFailure> {
        let fail = |stage: OpStage, error: StorageError| KeyFailure {
            key: source.to_string(),
            stage,
            error,
        };

        // Nested markers are rewritten so their body names the new path
        if PathNormalizer::is_marker_key(source) {
            return self
                .write_marker(&PathNormalizer::parent(destination))
                .await
                .map(|_| ())
                .map_err(|error| fail(OpStage::Writing, error));
        }

        let data = self
            .backend
            .get(source)
            .await
            .map_err(|error| fail(OpStage::Reading, error))?;
        let content_type = data
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| mime_for_name(destination).to_string());

        self.backend
            .put(destination, data.body, &content_type)
            .await
            .map(|_| ())
            .map_err(|error| fail(OpStage::Writing, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use identity::StaticGate;
    use services_storage::MemoryBackend;

    const ADMIN: StaticGate = StaticGate(true);
    const VIEWER: StaticGate = StaticGate(false);

    fn engine() -> (Arc<MemoryBackend>, FileOperationEngine) {
        let backend = Arc::new(MemoryBackend::new());
        let engine = FileOperationEngine::new(backend.clone());
        (backend, engine)
    }

    #[tokio::test]
    async fn test_create_folder_writes_marker() {
        let (backend, engine) = engine();

        let folder = engine.create_folder(&ADMIN, "/", "Docs").await.unwrap();
        assert_eq!(folder.name, "Docs");
        assert_eq!(folder.path, "/Docs/");

        let marker = backend.get("Docs/.folder").await.unwrap();
        let parsed = FolderMarker::from_json(&marker.body).unwrap();
        assert_eq!(parsed.path, "/Docs/");
        assert!(parsed.is_folder);
    }

    #[tokio::test]
    async fn test_create_folder_rejects_bad_names() {
        let (backend, engine) = engine();

        for name in ["", "..", "a/b", ".folder"] {
            let err = engine.create_folder(&ADMIN, "/", name).await.unwrap_err();
            assert!(matches!(err, OperationError::InvalidName(_)), "{:?}", name);
        }
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_viewer_cannot_mutate() {
        let (backend, engine) = engine();

        let err = engine.create_folder(&VIEWER, "/", "Docs").await.unwrap_err();
        assert_eq!(err, OperationError::PermissionDenied("create folder".to_string()));

        let err = engine
            .upload_file(&VIEWER, "/a.txt", Bytes::from_static(b"x"), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::PermissionDenied(_)));
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_upload_and_download() {
        let (_backend, engine) = engine();

        let file = engine
            .upload_file(&ADMIN, "/Docs/readme.txt", Bytes::from_static(b"hello"), "text/plain")
            .await
            .unwrap();
        assert_eq!(file.path, "/Docs/readme.txt");
        assert_eq!(file.size_bytes, 5);

        let data = engine.download_file("/Docs/readme.txt").await.unwrap();
        assert_eq!(data.body, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_upload_empty_content_type_uses_table() {
        let (backend, engine) = engine();

        engine
            .upload_file(&ADMIN, "/pic.png", Bytes::from_static(b"x"), "")
            .await
            .unwrap();
        let data = backend.get("pic.png").await.unwrap();
        assert_eq!(data.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let (backend, engine) = engine();
        let engine = engine.with_config(EngineConfig {
            max_upload_bytes: 4,
            ..EngineConfig::default()
        });

        let err = engine
            .upload_file(&ADMIN, "/big.bin", Bytes::from_static(b"12345"), "")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            OperationError::TooLarge {
                path: "/big.bin".to_string(),
                size: 5,
                limit: 4
            }
        );
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_upload_rejects_marker_names() {
        let (_backend, engine) = engine();
        let err = engine
            .upload_file(&ADMIN, "/x.folder", Bytes::new(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_download_missing() {
        let (_backend, engine) = engine();
        let err = engine.download_file("/nope.txt").await.unwrap_err();
        assert_eq!(err, OperationError::NotFound("/nope.txt".to_string()));
    }

    #[tokio::test]
    async fn test_delete_missing_folder_is_not_found() {
        let (_backend, engine) = engine();
        let err = engine
            .delete_item(&ADMIN, &Entry::folder("/Ghost"))
            .await
            .unwrap_err();
        assert_eq!(err, OperationError::NotFound("/Ghost/".to_string()));
    }

    #[tokio::test]
    async fn test_delete_root_rejected() {
        let (backend, engine) = engine();
        backend.put("a.txt", Bytes::from_static(b"x"), "").await.unwrap();

        let err = engine.delete_item(&ADMIN, &Entry::folder("/")).await.unwrap_err();
        assert!(matches!(err, OperationError::InvalidTarget(_)));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_rename_file_preserves_content_type() {
        let (backend, engine) = engine();
        backend
            .put("Docs/a.txt", Bytes::from_static(b"abc"), "text/plain")
            .await
            .unwrap();

        let outcome = engine.rename_file(&ADMIN, "/Docs/a.txt", "b.txt").await.unwrap();
        assert_eq!(
            outcome,
            TransferOutcome::Completed {
                source: "/Docs/a.txt".to_string(),
                destination: "/Docs/b.txt".to_string(),
                keys: vec!["Docs/a.txt".to_string()],
            }
        );
        assert!(!backend.contains("Docs/a.txt").await);
        let data = backend.get("Docs/b.txt").await.unwrap();
        assert_eq!(data.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_rename_to_same_name_is_noop() {
        let (backend, engine) = engine();
        backend.put("a.txt", Bytes::from_static(b"abc"), "").await.unwrap();

        let outcome = engine.rename_file(&ADMIN, "/a.txt", "a.txt").await.unwrap();
        assert!(matches!(outcome, TransferOutcome::Unchanged { .. }));
        assert!(backend.contains("a.txt").await);
    }

    #[tokio::test]
    async fn test_rename_folder_marker_only() {
        let (backend, engine) = engine();
        backend.put("Old/a.txt", Bytes::from_static(b"x"), "").await.unwrap();

        let outcome = engine.rename_folder(&ADMIN, "/Old", "New").await.unwrap();
        assert!(outcome.needs_manual_completion());
        assert!(backend.contains("New/.folder").await);
        assert!(backend.contains("Old/a.txt").await);
    }

    #[tokio::test]
    async fn test_rename_missing_folder() {
        let (_backend, engine) = engine();
        let err = engine.rename_folder(&ADMIN, "/Old", "New").await.unwrap_err();
        assert_eq!(err, OperationError::NotFound("/Old/".to_string()));
    }

    #[tokio::test]
    async fn test_move_folder_into_itself_rejected() {
        let (backend, engine) = engine();
        backend.put("A/x.txt", Bytes::from_static(b"x"), "").await.unwrap();

        let err = engine
            .move_item(&ADMIN, &Entry::folder("/A"), "/A/B")
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::InvalidTarget(_)));
    }

    #[tokio::test]
    async fn test_recursive_folder_move() {
        let (backend, engine) = engine();
        let engine = engine.with_config(EngineConfig {
            folder_strategy: FolderStrategy::Recursive,
            ..EngineConfig::default()
        });
        for key in ["Old/.folder", "Old/a.txt", "Old/sub/.folder", "Old/sub/b.txt"] {
            backend.put(key, Bytes::from_static(b"x"), "text/plain").await.unwrap();
        }

        let outcome = engine.rename_folder(&ADMIN, "/Old", "New").await.unwrap();
        match outcome {
            TransferOutcome::Completed { keys, .. } => assert_eq!(keys.len(), 3),
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert_eq!(
            backend.keys().await,
            vec![
                "New/.folder".to_string(),
                "New/a.txt".to_string(),
                "New/sub/.folder".to_string(),
                "New/sub/b.txt".to_string(),
            ]
        );
        let nested = FolderMarker::from_json(&backend.get("New/sub/.folder").await.unwrap().body).unwrap();
        assert_eq!(nested.path, "/New/sub/");
    }

    #[tokio::test]
    async fn test_upload_batch_reports_per_file() {
        let (backend, engine) = engine();
        let engine = engine.with_config(EngineConfig {
            max_upload_bytes: 3,
            ..EngineConfig::default()
        });

        let report = engine
            .upload_batch(
                &ADMIN,
                "/Docs",
                vec![
                    UploadRequest::new("a.txt", Bytes::from_static(b"abc"), "text/plain"),
                    UploadRequest::new("big.txt", Bytes::from_static(b"abcd"), "text/plain"),
                    UploadRequest::new("bad.folder", Bytes::from_static(b"a"), ""),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.uploaded.len(), 1);
        assert_eq!(report.too_large.len(), 1);
        assert_eq!(report.too_large[0].path, "/Docs/big.txt");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(backend.keys().await, vec!["Docs/a.txt".to_string()]);
    }
}
