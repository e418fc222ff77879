//! Operation results and errors
//!
//! This module defines what the file operation engine reports back: the
//! error taxonomy, the stage machine of multi-step operations, and the
//! reports produced by bulk operations.

use fs_view::{FileEntry, FolderEntry, PathNormalizer};
use serde::{Deserialize, Serialize};
use services_storage::StorageError;
use std::fmt;
use thiserror::Error;

/// Default upload ceiling (2 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Stage of a multi-step operation
///
/// `Idle → Reading → Writing → Finalizing → Done`. `Done { partial: true }`
/// is reached when a later step fails after an earlier one committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpStage {
    Idle,
    Reading,
    Writing,
    Finalizing,
    Done { partial: bool },
}

impl fmt::Display for OpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpStage::Idle => write!(f, "idle"),
            OpStage::Reading => write!(f, "read"),
            OpStage::Writing => write!(f, "write"),
            OpStage::Finalizing => write!(f, "delete"),
            OpStage::Done { partial: false } => write!(f, "done"),
            OpStage::Done { partial: true } => write!(f, "done (partial)"),
        }
    }
}

/// Walks one operation through its stages
///
/// Records which stages completed so a late failure can say exactly what
/// was already committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTracker {
    current: OpStage,
    completed: Vec<OpStage>,
}

impl StageTracker {
    /// Starts in `Idle`
    pub fn new() -> Self {
        Self {
            current: OpStage::Idle,
            completed: Vec::new(),
        }
    }

    /// Moves to the next stage
    pub fn enter(&mut self, stage: OpStage) {
        self.current = stage;
    }

    /// Marks the current stage as completed
    pub fn complete(&mut self) {
        self.completed.push(self.current);
    }

    /// Stage currently running (or last failed)
    pub fn current(&self) -> OpStage {
        self.current
    }

    /// Stages that completed, in order
    pub fn completed(&self) -> &[OpStage] {
        &self.completed
    }

    /// Returns true once a stage that changes the store has completed
    pub fn has_committed(&self) -> bool {
        self.completed
            .iter()
            .any(|s| matches!(s, OpStage::Writing | OpStage::Finalizing))
    }

    /// Moves to the terminal stage
    pub fn finish(&mut self, partial: bool) -> OpStage {
        self.current = OpStage::Done { partial };
        self.current
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One failed constituent call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFailure {
    /// Key the call was made for
    pub key: String,
    /// Stage that failed
    pub stage: OpStage,
    /// Backend error
    pub error: StorageError,
}

impl fmt::Display for KeyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.key, self.stage, self.error)
    }
}

/// A multi-step or bulk operation that changed the store and then failed
///
/// The store is left in an intermediate state that may need manual cleanup,
/// such as a duplicate file after a rename whose delete step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialFailure {
    /// Operation name (`delete`, `rename`, `move`, ...)
    pub operation: String,
    /// Number of constituent keys attempted
    pub attempted: usize,
    /// Keys for which every step succeeded
    pub completed: Vec<String>,
    /// Stages that completed before the failure (single-key operations)
    pub completed_stages: Vec<OpStage>,
    /// Every failed constituent call
    pub failures: Vec<KeyFailure>,
}

impl PartialFailure {
    /// Number of failed constituent calls
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Keys that failed
    pub fn failed_keys(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.key.as_str()).collect()
    }
}

impl fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} incomplete: {} of {} failed",
            self.operation,
            self.failed_count(),
            self.attempted
        )?;
        if !self.completed_stages.is_empty() {
            let stages: Vec<String> = self.completed_stages.iter().map(|s| s.to_string()).collect();
            write!(f, " after {}", stages.join(", "))?;
        }
        for failure in &self.failures {
            write!(f, "; {}", failure)?;
        }
        Ok(())
    }
}

/// Errors that can occur during file operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    /// Access check failed; nothing was attempted
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Target is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upload exceeds the size ceiling; checked before any backend call
    #[error("File too large: {path} ({size} bytes, limit {limit})")]
    TooLarge { path: String, size: u64, limit: u64 },

    /// Name rejected before any backend call
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Destination rejected before any backend call
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Opaque backend failure; nothing was committed
    #[error("Storage error: {0}")]
    Storage(StorageError),

    /// Some steps committed, some failed
    #[error("Partial failure: {0}")]
    PartialFailure(PartialFailure),
}

impl OperationError {
    /// Returns true if the store may need manual cleanup
    pub fn needs_cleanup(&self) -> bool {
        matches!(self, OperationError::PartialFailure(_))
    }

    /// Returns the partial-failure details, if any
    pub fn partial(&self) -> Option<&PartialFailure> {
        match self {
            OperationError::PartialFailure(partial) => Some(partial),
            _ => None,
        }
    }
}

impl From<StorageError> for OperationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                OperationError::NotFound(PathNormalizer::display_path(&key))
            }
            other => OperationError::Storage(other),
        }
    }
}

/// How folder rename, copy and move are carried out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderStrategy {
    /// Write a marker at the destination and leave contents where they are
    #[default]
    MarkerOnly,
    /// Copy every descendant, then delete the sources for moves
    Recursive,
}

impl fmt::Display for FolderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderStrategy::MarkerOnly => write!(f, "marker_only"),
            FolderStrategy::Recursive => write!(f, "recursive"),
        }
    }
}

impl std::str::FromStr for FolderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marker_only" | "marker-only" | "marker" => Ok(FolderStrategy::MarkerOnly),
            "recursive" => Ok(FolderStrategy::Recursive),
            other => Err(format!("unknown folder strategy: {}", other)),
        }
    }
}

/// Engine limits and policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Largest accepted upload
    pub max_upload_bytes: u64,
    /// Folder rename/copy/move contract
    pub folder_strategy: FolderStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            folder_strategy: FolderStrategy::MarkerOnly,
        }
    }
}

/// Result of a successful rename, copy or move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Every key was transferred
    Completed {
        /// Source display path
        source: String,
        /// Destination display path
        destination: String,
        /// Source keys that were transferred
        keys: Vec<String>,
    },
    /// Source and destination are the same key
    Unchanged { path: String },
    /// Only a destination marker was written; contents were not moved
    ManualCompletionRequired {
        /// Folder left untouched
        source: String,
        /// Folder created empty
        created: FolderEntry,
    },
}

impl TransferOutcome {
    /// Returns true if the caller still has work to do
    pub fn needs_manual_completion(&self) -> bool {
        matches!(self, TransferOutcome::ManualCompletionRequired { .. })
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Completed {
                source,
                destination,
                keys,
            } => write!(f, "{} -> {} ({} objects)", source, destination, keys.len()),
            TransferOutcome::Unchanged { path } => write!(f, "{} unchanged", path),
            TransferOutcome::ManualCompletionRequired { source, created } => write!(
                f,
                "created {}; contents of {} must be moved manually",
                created.path, source
            ),
        }
    }
}

/// Outcome of deleting a file or folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    /// Display path that was deleted
    pub path: String,
    /// Keys removed from the store
    pub deleted: Vec<String>,
}

/// One file in an upload batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// File name within the target directory
    pub name: String,
    /// File body
    pub body: bytes::Bytes,
    /// Declared content type
    pub content_type: String,
}

impl UploadRequest {
    /// Creates an upload request
    pub fn new(name: impl Into<String>, body: impl Into<bytes::Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            content_type: content_type.into(),
        }
    }
}

/// A file refused by the size check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedUpload {
    /// Display path the file would have had
    pub path: String,
    /// File size
    pub size: u64,
    /// Ceiling in force
    pub limit: u64,
}

/// Per-file results of an upload batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    /// Files written
    pub uploaded: Vec<FileEntry>,
    /// Files over the ceiling, never sent to the backend
    pub too_large: Vec<RejectedUpload>,
    /// Files rejected by name or by the backend
    pub failed: Vec<(String, OperationError)>,
}

impl UploadReport {
    /// Returns true if every file was written
    pub fn is_complete(&self) -> bool {
        self.too_large.is_empty() && self.failed.is_empty()
    }

    /// Number of files in the batch
    pub fn total(&self) -> usize {
        self.uploaded.len() + self.too_large.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tracker_commit_detection() {
        let mut tracker = StageTracker::new();
        assert_eq!(tracker.current(), OpStage::Idle);

        tracker.enter(OpStage::Reading);
        tracker.complete();
        assert!(!tracker.has_committed());

        tracker.enter(OpStage::Writing);
        tracker.complete();
        assert!(tracker.has_committed());

        tracker.enter(OpStage::Finalizing);
        assert_eq!(tracker.completed(), &[OpStage::Reading, OpStage::Writing]);
        assert_eq!(tracker.finish(true), OpStage::Done { partial: true });
    }

    #[test]
    fn test_storage_not_found_maps_to_display_path() {
        let err: OperationError = StorageError::NotFound("Docs/a.txt".to_string()).into();
        assert_eq!(err, OperationError::NotFound("/Docs/a.txt".to_string()));

        let err: OperationError = StorageError::backend("io", "disk").into();
        assert!(matches!(err, OperationError::Storage(_)));
        assert!(!err.needs_cleanup());
    }

    #[test]
    fn test_partial_failure_display() {
        let partial = PartialFailure {
            operation: "rename".to_string(),
            attempted: 1,
            completed: Vec::new(),
            completed_stages: vec![OpStage::Reading, OpStage::Writing],
            failures: vec![KeyFailure {
                key: "a.txt".to_string(),
                stage: OpStage::Finalizing,
                error: StorageError::backend("injected", "boom"),
            }],
        };

        let err = OperationError::PartialFailure(partial);
        assert!(err.needs_cleanup());
        assert_eq!(
            err.to_string(),
            "Partial failure: rename incomplete: 1 of 1 failed after read, write; \
             a.txt (delete): Storage error [injected]: boom"
        );
        assert_eq!(err.partial().unwrap().failed_keys(), vec!["a.txt"]);
    }

    #[test]
    fn test_folder_strategy_parse() {
        assert_eq!("recursive".parse::<FolderStrategy>(), Ok(FolderStrategy::Recursive));
        assert_eq!("marker_only".parse::<FolderStrategy>(), Ok(FolderStrategy::MarkerOnly));
        assert!("sideways".parse::<FolderStrategy>().is_err());
        assert_eq!(FolderStrategy::default(), FolderStrategy::MarkerOnly);
    }

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_upload_report_counts() {
        let mut report = UploadReport::default();
        assert!(report.is_complete());

        report.too_large.push(RejectedUpload {
            path: "/big.bin".to_string(),
            size: 10,
            limit: 5,
        });
        assert!(!report.is_complete());
        assert_eq!(report.total(), 1);
    }
}
