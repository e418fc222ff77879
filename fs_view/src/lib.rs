//! # Filesystem View
//!
//! This crate provides a folder hierarchy view over a flat object key space.
//!
//! ## Philosophy
//!
//! - **Folders are views, not objects**: the bucket only holds keys; folders
//!   are inferred from shared key prefixes and explicit `.folder` markers
//! - **Paths are total**: every input string normalizes to some path, the
//!   worst case being the root
//! - **Entries are tagged**: a node is either a `Folder` or a `File`, never
//!   guessed from which fields happen to be present
//!
//! ## Design
//!
//! - User-facing paths start with `/` (`/Docs/readme.txt`); folder paths also
//!   end with `/` (`/Docs/`)
//! - Backend keys never start with `/` (`Docs/readme.txt`)
//! - An empty folder stays visible through a marker object at
//!   `<folder>/.folder`

pub mod directory;
pub mod marker;
pub mod mime;
pub mod path;

pub use directory::{DirectoryListing, Entry, EntryKind, FileEntry, FolderEntry, YoutubeLink};
pub use marker::FolderMarker;
pub use mime::{mime_for_name, type_label, FOLDER_MIME, OCTET_STREAM};
pub use path::{PathNormalizer, MARKER_NAME};
