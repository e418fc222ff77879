//! # Storage Service
//!
//! This crate defines the flat object store the explorer is built on.
//!
//! ## Philosophy
//!
//! **The bucket knows nothing about folders.**
//!
//! A backend offers four primitives over a flat key space:
//! - `list` by prefix, optionally rolled up at a delimiter
//! - `get` a body
//! - `put` a body (overwrite wins)
//! - `delete` a key
//!
//! There is no rename, no copy, no transaction. Anything hierarchical is
//! composed on top by the namespace layer.
//!
//! ## Design
//!
//! - **StorageBackend**: async capability trait, object safe so callers hold
//!   `Arc<dyn StorageBackend>`
//! - **MemoryBackend**: in-process sorted map, the demo and test store
//! - **LocalDirBackend**: keys mapped onto a directory tree
//! - **FailingBackend**: wrapper that injects failures and records calls
//! - **seed_demo_data**: sample folders and files for a fresh demo store

pub mod backend;
pub mod demo;
pub mod error;
pub mod failing;
pub mod local_dir;
pub mod memory;

pub use backend::{
    paginate, ListPage, ListRequest, ObjectData, ObjectSummary, PutReceipt, StorageBackend,
    DEFAULT_PAGE_SIZE,
};
pub use demo::seed_demo_data;
pub use error::{StorageError, StorageResult};
pub use failing::{BackendCall, BackendOp, FailingBackend, FailurePolicy};
pub use local_dir::LocalDirBackend;
pub use memory::MemoryBackend;
