//! # Explorer Settings
//!
//! Typed configuration for the explorer.
//!
//! ## Philosophy
//!
//! - **Typed settings**: every setting has an explicit type and a known key
//! - **Layered**: defaults, then an optional file, then `key=value` overrides
//! - **Deterministic**: settings are serializable and reproducible
//!
//! ## Example
//!
//! ```
//! use services_settings::{ExplorerSettings, SettingKey};
//!
//! let mut settings = ExplorerSettings::default();
//! settings.apply_override("folders.strategy=recursive").unwrap();
//! assert_eq!(settings.get(SettingKey::FoldersStrategy), "recursive");
//! ```

pub mod persistence;

pub use persistence::{
    deserialize_settings, load_settings_file, load_settings_safe, save_settings_file,
    serialize_settings, PersistenceError, PersistenceResult, SettingsFile,
};

use serde::{Deserialize, Serialize};
use services_fs_view::{EngineConfig, FolderStrategy, DEFAULT_MAX_UPLOAD_BYTES};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Default page size for backend listings
pub const DEFAULT_LIST_PAGE_SIZE: usize = 1000;

/// Default directory for the local backend
pub const DEFAULT_LOCAL_ROOT: &str = "./bucket";

/// Default number of activity entries kept
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 500;

/// Which object store backs the explorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendSettings {
    /// In-process store, lost on exit
    Memory {
        /// Fill an empty store with sample folders and files
        seed_demo: bool,
    },
    /// Files under a directory on disk
    LocalDir {
        /// Directory holding the objects
        root: PathBuf,
    },
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings::Memory { seed_demo: true }
    }
}

impl BackendSettings {
    /// Short name of the backend kind
    pub fn kind(&self) -> &'static str {
        match self {
            BackendSettings::Memory { .. } => "memory",
            BackendSettings::LocalDir { .. } => "local_dir",
        }
    }
}

/// All explorer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    /// Object store selection
    pub backend: BackendSettings,
    /// Largest accepted upload
    pub max_upload_bytes: u64,
    /// Folder rename/copy/move contract
    pub folder_strategy: FolderStrategy,
    /// Page size for backend listings
    pub list_page_size: usize,
    /// Where YouTube links are persisted (in memory only when unset)
    pub links_file: Option<PathBuf>,
    /// Number of activity entries kept in memory
    pub activity_capacity: usize,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            folder_strategy: FolderStrategy::default(),
            list_page_size: DEFAULT_LIST_PAGE_SIZE,
            links_file: None,
            activity_capacity: DEFAULT_ACTIVITY_CAPACITY,
        }
    }
}

/// Setting key (dotted identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    BackendKind,
    BackendRoot,
    BackendSeedDemo,
    UploadMaxBytes,
    FoldersStrategy,
    ListingPageSize,
    LinksFile,
    ActivityCapacity,
}

impl SettingKey {
    /// Every key, in display order
    pub const ALL: [SettingKey; 8] = [
        SettingKey::BackendKind,
        SettingKey::BackendRoot,
        SettingKey::BackendSeedDemo,
        SettingKey::UploadMaxBytes,
        SettingKey::FoldersStrategy,
        SettingKey::ListingPageSize,
        SettingKey::LinksFile,
        SettingKey::ActivityCapacity,
    ];

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::BackendKind => "backend.kind",
            SettingKey::BackendRoot => "backend.root",
            SettingKey::BackendSeedDemo => "backend.seed_demo",
            SettingKey::UploadMaxBytes => "upload.max_bytes",
            SettingKey::FoldersStrategy => "folders.strategy",
            SettingKey::ListingPageSize => "listing.page_size",
            SettingKey::LinksFile => "links.file",
            SettingKey::ActivityCapacity => "activity.capacity",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// Override errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Expected key=value, got: {0}")]
    MalformedOverride(String),

    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: SettingKey, reason: String },
}

impl SettingsError {
    fn invalid(key: SettingKey, reason: impl fmt::Display) -> Self {
        SettingsError::InvalidValue {
            key,
            reason: reason.to_string(),
        }
    }
}

impl ExplorerSettings {
    /// Engine limits derived from these settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_upload_bytes: self.max_upload_bytes,
            folder_strategy: self.folder_strategy,
        }
    }

    /// Current value of a setting, rendered as text
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::BackendKind => self.backend.kind().to_string(),
            SettingKey::BackendRoot => match &self.backend {
                BackendSettings::LocalDir { root } => root.display().to_string(),
                BackendSettings::Memory { .. } => String::new(),
            },
            SettingKey::BackendSeedDemo => match &self.backend {
                BackendSettings::Memory { seed_demo } => seed_demo.to_string(),
                BackendSettings::LocalDir { .. } => false.to_string(),
            },
            SettingKey::UploadMaxBytes => self.max_upload_bytes.to_string(),
            SettingKey::FoldersStrategy => self.folder_strategy.to_string(),
            SettingKey::ListingPageSize => self.list_page_size.to_string(),
            SettingKey::LinksFile => self
                .links_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            SettingKey::ActivityCapacity => self.activity_capacity.to_string(),
        }
    }

    /// Every setting with its current value
    pub fn describe(&self) -> Vec<(SettingKey, String)> {
        SettingKey::ALL
            .into_iter()
            .map(|key| (key, self.get(key)))
            .collect()
    }

    /// Applies one `key=value` override
    pub fn apply_override(&mut self, assignment: &str) -> Result<SettingKey, SettingsError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| SettingsError::MalformedOverride(assignment.to_string()))?;
        let key: SettingKey = key.trim().parse()?;
        self.set(key, value.trim())?;
        Ok(key)
    }

    /// Applies overrides in order; the first bad one stops the rest
    pub fn apply_overrides<'a>(
        &mut self,
        assignments: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), SettingsError> {
        for assignment in assignments {
            self.apply_override(assignment)?;
        }
        Ok(())
    }

    /// Sets one setting from text
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        match key {
            SettingKey::BackendKind => {
                self.backend = match value {
                    "memory" => match self.backend {
                        BackendSettings::Memory { seed_demo } => BackendSettings::Memory { seed_demo },
                        BackendSettings::LocalDir { .. } => BackendSettings::Memory { seed_demo: false },
                    },
                    "local_dir" | "local" => match &self.backend {
                        BackendSettings::LocalDir { root } => BackendSettings::LocalDir { root: root.clone() },
                        BackendSettings::Memory { .. } => BackendSettings::LocalDir {
                            root: PathBuf::from(DEFAULT_LOCAL_ROOT),
                        },
                    },
                    other => return Err(SettingsError::invalid(key, format!("unknown backend {}", other))),
                };
            }
            SettingKey::BackendRoot => {
                if value.is_empty() {
                    return Err(SettingsError::invalid(key, "empty path"));
                }
                self.backend = BackendSettings::LocalDir {
                    root: PathBuf::from(value),
                };
            }
            SettingKey::BackendSeedDemo => {
                let seed: bool = value.parse().map_err(|e| SettingsError::invalid(key, e))?;
                match &mut self.backend {
                    BackendSettings::Memory { seed_demo } => *seed_demo = seed,
                    BackendSettings::LocalDir { .. } => {
                        return Err(SettingsError::invalid(key, "only the memory backend is seeded"))
                    }
                }
            }
            SettingKey::UploadMaxBytes => {
                self.max_upload_bytes = value.parse().map_err(|e| SettingsError::invalid(key, e))?;
            }
            SettingKey::FoldersStrategy => {
                self.folder_strategy = value.parse().map_err(|e| SettingsError::invalid(key, e))?;
            }
            SettingKey::ListingPageSize => {
                let size: usize = value.parse().map_err(|e| SettingsError::invalid(key, e))?;
                if size == 0 {
                    return Err(SettingsError::invalid(key, "must be at least 1"));
                }
                self.list_page_size = size;
            }
            SettingKey::LinksFile => {
                self.links_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            SettingKey::ActivityCapacity => {
                self.activity_capacity = value.parse().map_err(|e| SettingsError::invalid(key, e))?;
            }
        }
        Ok(())
    }
}
