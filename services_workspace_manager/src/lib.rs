//! # Workspace Manager Service
//!
//! This crate ties the explorer together: one session, one current folder,
//! one object store.
//!
//! ## Philosophy
//!
//! - **The listing is derived, never patched**: every navigation and every
//!   mutation rebuilds the current listing from the backend
//! - **Access is explicit**: the session is the gate handed to every
//!   mutating operation
//! - **Every mutation is auditable**: one activity entry per attempt,
//!   whether it succeeded, partially succeeded or failed
//! - **Side tables follow the store**: YouTube links are re-keyed or
//!   dropped only for keys that really moved or disappeared
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A transaction manager; partial failures are reported, not rolled back
//! - An authentication system; `login` trusts the email it is given

pub mod bootstrap;
pub mod session;
pub mod workspace;

pub use bootstrap::open_backend;
pub use session::Session;
pub use workspace::{Crumb, Workspace};

use identity::IdentityError;
use services_clipboard::PasteError;
use services_fs_view::OperationError;
use services_media_links::{LinkError, PersistenceError as LinkPersistenceError};
use services_storage::StorageError;
use thiserror::Error;

/// Workspace errors
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Nothing to paste")]
    EmptyClipboard,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("Link persistence failed: {0}")]
    LinkPersistence(#[from] LinkPersistenceError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl WorkspaceError {
    /// Returns true if some steps took effect and cleanup may be needed
    pub fn needs_cleanup(&self) -> bool {
        matches!(self, WorkspaceError::Operation(err) if err.needs_cleanup())
    }
}

impl From<PasteError> for WorkspaceError {
    fn from(err: PasteError) -> Self {
        match err {
            PasteError::EmptyClipboard => WorkspaceError::EmptyClipboard,
            PasteError::Operation(err) => WorkspaceError::Operation(err),
        }
    }
}
