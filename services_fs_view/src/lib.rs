//! # Filesystem View Service
//!
//! This service provides a folder hierarchy and file operations over a flat
//! object store.
//!
//! ## Philosophy
//!
//! - Listings are projections, rebuilt from the backend on every request
//! - Mutations are decompositions into backend primitives, never pretending
//!   to be atomic
//! - A step that fails after an earlier step committed is a partial
//!   failure, always reported and never retried silently
//! - Access is checked before the first backend call
//!
//! ## Operations
//!
//! - `project(path)`: List one directory level
//! - `create_folder(parent, name)`: Write a folder marker
//! - `upload_file(path, body, content_type)`: Write one object
//! - `upload_batch(dir, files)`: Write many, reporting each
//! - `download_file(path)`: Read one object
//! - `delete_item(entry)`: Delete a file, or a folder and all its descendants
//! - `rename_file(path, name)`: Download, upload, delete
//! - `rename_folder(path, name)`: Per the configured folder strategy
//! - `rename_item(entry, name)`: Either of the above, reading files from their listed key
//! - `copy_item(entry, dest)` / `move_item(entry, dest)`: Paste primitives

pub mod operations;
pub mod projector;
pub mod service;

pub use operations::{
    DeleteReport, EngineConfig, FolderStrategy, KeyFailure, OpStage, OperationError,
    PartialFailure, RejectedUpload, StageTracker, TransferOutcome, UploadReport, UploadRequest,
    DEFAULT_MAX_UPLOAD_BYTES,
};
pub use projector::NamespaceProjector;
pub use service::FileOperationEngine;
