//! Backend error type

use thiserror::Error;

/// Errors reported by a storage backend
///
/// The file operation engine treats everything except `NotFound` as opaque.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The key does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Any other backend failure
    #[error("Storage error [{code}]: {message}")]
    Backend {
        /// Short machine-readable code (`io`, `invalid_key`, `injected`, ...)
        code: String,
        /// Human-readable detail
        message: String,
    },
}

impl StorageError {
    /// Creates an opaque backend error
    pub fn backend(code: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::Backend {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Maps an I/O error for `key`, keeping "not found" distinguishable
    pub fn from_io(key: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(key.to_string())
        } else {
            StorageError::backend("io", format!("{}: {}", key, err))
        }
    }

    /// Returns true if the error reports a missing key
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for backend calls
pub type StorageResult<T> = Result<T, StorageError>;
