//! # Media Links
//!
//! A side table that attaches YouTube videos to files.
//!
//! ## Philosophy
//!
//! - **Links are not objects**: they live next to the bucket, keyed by the
//!   file's display path, and never touch the object store
//! - **One link per file**: attaching again replaces the old link
//! - **Cascade is explicit**: the caller tells the table when files are
//!   deleted, renamed or moved; the table never looks at the bucket
//!
//! ## Features
//!
//! - URL validation (`youtube.com` or `youtu.be`)
//! - Default title when none is given
//! - Re-keying for renamed files and moved folders
//! - Versioned JSON persistence

pub mod persistence;
pub mod table;

pub use persistence::{
    deserialize_links, load_links, save_links, serialize_links, LinksData, PersistenceError,
    PersistenceResult,
};
pub use table::{LinkError, LinkTable, DEFAULT_TITLE};
