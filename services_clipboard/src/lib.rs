//! # Clipboard
//!
//! Holds at most one pending copy or cut and resolves it on paste.
//!
//! ## Design
//!
//! - Last action wins: a new copy or cut replaces whatever was pending
//! - A copy stays pending after paste, so it can be pasted again
//! - A cut is consumed by a successful paste and kept after a failed one,
//!   so the user can retry
//! - The clipboard belongs to one session and has a single writer

use fs_view::Entry;
use identity::AccessGate;
use services_fs_view::{FileOperationEngine, OperationError, TransferOutcome};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// What paste should do with the pending item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardAction {
    Copy,
    Cut,
}

impl fmt::Display for ClipboardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardAction::Copy => write!(f, "copy"),
            ClipboardAction::Cut => write!(f, "cut"),
        }
    }
}

/// The pending intent
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub action: ClipboardAction,
    pub item: Entry,
}

/// Result of a successful paste
#[derive(Debug, Clone, PartialEq)]
pub struct PasteResult {
    /// Entry that was pasted
    pub entry: ClipboardEntry,
    /// What the engine did
    pub outcome: TransferOutcome,
}

/// Paste failures
#[derive(Debug, Error, PartialEq)]
pub enum PasteError {
    #[error("Clipboard is empty")]
    EmptyClipboard,

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Single-slot clipboard
#[derive(Debug, Clone, Default)]
pub struct ClipboardCoordinator {
    pending: Option<ClipboardEntry>,
}

impl ClipboardCoordinator {
    /// Creates an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an entry for copying
    pub fn copy(&mut self, item: Entry) {
        self.set(ClipboardAction::Copy, item);
    }

    /// Marks an entry for moving
    pub fn cut(&mut self, item: Entry) {
        self.set(ClipboardAction::Cut, item);
    }

    fn set(&mut self, action: ClipboardAction, item: Entry) {
        debug!(%action, path = item.path(), "clipboard set");
        self.pending = Some(ClipboardEntry { action, item });
    }

    /// Returns the pending entry
    pub fn pending(&self) -> Option<&ClipboardEntry> {
        self.pending.as_ref()
    }

    /// Checks if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Drops the pending entry
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Pastes the pending entry into `destination`
    pub async fn paste(
        &mut self,
        engine: &FileOperationEngine,
        gate: &dyn AccessGate,
        destination: &str,
    ) -> Result<PasteResult, PasteError> {
        let entry = self.pending.clone().ok_or(PasteError::EmptyClipboard)?;

        let outcome = match entry.action {
            ClipboardAction::Copy => engine.copy_item(gate, &entry.item, destination).await?,
            ClipboardAction::Cut => engine.move_item(gate, &entry.item, destination).await?,
        };

        if entry.action == ClipboardAction::Cut {
            self.pending = None;
        }

        Ok(PasteResult { entry, outcome })
    }
}
