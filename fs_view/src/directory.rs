//! Directory view and entry types
//!
//! This module defines how one level of the folder hierarchy is represented.

use crate::mime::{mime_for_name, FOLDER_MIME};
use crate::path::PathNormalizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of namespace node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Inferred from key prefixes or a marker object
    Folder,
    /// A real object in the bucket
    File,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Folder => write!(f, "Folder"),
            EntryKind::File => write!(f, "File"),
        }
    }
}

/// A YouTube video attached to a file
///
/// Lives in a side table keyed by file path, not in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeLink {
    /// Display path of the file the link belongs to
    pub file_path: String,
    /// Video URL
    pub url: String,
    /// Human-readable title
    pub title: String,
    /// When the link was (last) saved
    pub created_at: DateTime<Utc>,
}

/// A folder in a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Last non-empty segment of the path
    pub name: String,
    /// Display path with leading and trailing `/`
    pub path: String,
}

impl FolderEntry {
    /// Creates a folder entry from any spelling of its path
    pub fn from_path(path: &str) -> Self {
        Self {
            name: PathNormalizer::basename(path).to_string(),
            path: PathNormalizer::folder_display_path(path),
        }
    }

    /// List prefix for the folder's descendants (`Docs/`)
    pub fn prefix(&self) -> String {
        PathNormalizer::folder_prefix(&self.path)
    }
}

/// A file in a directory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Last segment of the path
    pub name: String,
    /// Display path with leading `/`
    pub path: String,
    /// Content type reported by the backend or looked up by extension
    pub mime_type: String,
    /// Object size
    pub size_bytes: u64,
    /// Last modification time, if the backend reports one
    pub last_modified: Option<DateTime<Utc>>,
    /// Key of the object in the bucket
    pub backend_key: String,
    /// Attached video, if any
    pub youtube_link: Option<YoutubeLink>,
}

impl FileEntry {
    /// Creates a file entry from a backend key
    ///
    /// The key is kept as given, even when it holds empty segments, so
    /// later calls address the object that was listed. Metadata defaults to
    /// what the key alone can tell; use the builder methods to fill in what
    /// the backend reported.
    pub fn from_key(key: &str) -> Self {
        let normalized = PathNormalizer::normalize(key);
        Self {
            name: PathNormalizer::basename(&normalized).to_string(),
            path: PathNormalizer::display_path(&normalized),
            mime_type: mime_for_name(&normalized).to_string(),
            size_bytes: 0,
            last_modified: None,
            backend_key: key.to_string(),
            youtube_link: None,
        }
    }

    /// Creates a file entry from a user-facing path
    pub fn from_path(path: &str) -> Self {
        Self::from_key(&PathNormalizer::normalize(path))
    }

    /// Sets the content type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Sets the size
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Sets the modification time
    pub fn with_last_modified(mut self, last_modified: Option<DateTime<Utc>>) -> Self {
        self.last_modified = last_modified;
        self
    }
}

/// A namespace node: either a folder or a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    /// Folder node
    Folder(FolderEntry),
    /// File node
    File(FileEntry),
}

impl Entry {
    /// Creates a folder entry from a path
    pub fn folder(path: &str) -> Self {
        Entry::Folder(FolderEntry::from_path(path))
    }

    /// Creates a file entry from a path
    pub fn file(path: &str) -> Self {
        Entry::File(FileEntry::from_path(path))
    }

    /// Returns the entry name
    pub fn name(&self) -> &str {
        match self {
            Entry::Folder(folder) => &folder.name,
            Entry::File(file) => &file.name,
        }
    }

    /// Returns the display path
    pub fn path(&self) -> &str {
        match self {
            Entry::Folder(folder) => &folder.path,
            Entry::File(file) => &file.path,
        }
    }

    /// Returns the entry kind
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Folder(_) => EntryKind::Folder,
            Entry::File(_) => EntryKind::File,
        }
    }

    /// Returns true for folders
    pub fn is_folder(&self) -> bool {
        matches!(self, Entry::Folder(_))
    }

    /// Returns the mime type; folders report the synthetic folder type
    pub fn mime_type(&self) -> &str {
        match self {
            Entry::Folder(_) => FOLDER_MIME,
            Entry::File(file) => &file.mime_type,
        }
    }
}

impl From<FolderEntry> for Entry {
    fn from(folder: FolderEntry) -> Self {
        Entry::Folder(folder)
    }
}

impl From<FileEntry> for Entry {
    fn from(file: FileEntry) -> Self {
        Entry::File(file)
    }
}

/// One level of the hierarchy: immediate child folders and files
///
/// Listings are rebuilt from the backend on every navigation or mutation;
/// nothing patches them in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// Folder display path of the listed directory
    pub path: String,
    /// Child folders, sorted by name
    pub folders: Vec<FolderEntry>,
    /// Child files, sorted by name
    pub files: Vec<FileEntry>,
}

impl DirectoryListing {
    /// Creates an empty listing for a directory
    pub fn empty(path: &str) -> Self {
        Self {
            path: PathNormalizer::folder_display_path(path),
            folders: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Returns true if the directory has no visible children
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    /// Counts visible children
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    /// Gets a child by name; folders win over files of the same name
    pub fn find(&self, name: &str) -> Option<Entry> {
        self.folders
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .map(Entry::Folder)
            .or_else(|| {
                self.files
                    .iter()
                    .find(|f| f.name == name)
                    .cloned()
                    .map(Entry::File)
            })
    }

    /// Lists all children, folders first
    pub fn entries(&self) -> Vec<Entry> {
        self.folders
            .iter()
            .cloned()
            .map(Entry::Folder)
            .chain(self.files.iter().cloned().map(Entry::File))
            .collect()
    }

    /// Keeps only children whose name contains `term` (case-insensitive)
    pub fn filtered(&self, term: &str) -> Self {
        let needle = term.to_lowercase();
        Self {
            path: self.path.clone(),
            folders: self
                .folders
                .iter()
                .filter(|f| f.name.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
            files: self
                .files
                .iter()
                .filter(|f| f.name.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
        }
    }
}
