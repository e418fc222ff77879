//! Resilience Test Utilities
//!
//! This crate provides shared utilities for resilience and integration tests.
//!
//! ## Test Philosophy
//!
//! - **Failures are reported, never hidden**: a bulk operation that fails
//!   part-way says exactly which keys took effect
//! - **Deterministic failures**: every fault comes from a `FailurePolicy`
//! - **Side tables stay consistent**: links move or vanish only with the
//!   keys that really moved or vanished
//! - **Denied means untouched**: an access failure makes no object calls

use bytes::Bytes;
use identity::User;
use services_fs_view::EngineConfig;
use services_storage::{FailingBackend, FailurePolicy, MemoryBackend};
use services_workspace_manager::{Session, Workspace};
use std::sync::Arc;

/// A workspace over a fault-injectable in-memory store
pub struct Harness {
    /// The store, for setting policies and reading the call log
    pub backend: Arc<FailingBackend<MemoryBackend>>,
    /// Workspace logged in as an admin
    pub workspace: Workspace,
}

impl Harness {
    /// Creates a harness with no failures
    pub fn new(config: EngineConfig) -> Self {
        let backend = Arc::new(FailingBackend::new(MemoryBackend::new(), FailurePolicy::Never));
        let workspace = Workspace::new(backend.clone())
            .with_config(config)
            .with_session(Session::for_user(User::admin("admin@example.com", "Administrator")));
        Self { backend, workspace }
    }

    /// Creates a root-level folder holding the given files, each with a link
    ///
    /// Leaves the workspace at the root.
    pub async fn seed_linked_folder(&mut self, folder: &str, files: &[&str]) {
        self.workspace
            .create_folder(folder)
            .await
            .unwrap_or_else(|e| panic!("create {}: {}", folder, e));
        self.workspace
            .navigate_to(&format!("/{}", folder))
            .await
            .unwrap_or_else(|e| panic!("navigate {}: {}", folder, e));

        for name in files {
            self.workspace
                .upload(name, Bytes::from(name.as_bytes().to_vec()), "")
                .await
                .unwrap_or_else(|e| panic!("upload {}: {}", name, e));
            self.workspace
                .attach_link(name, "https://youtu.be/seed", name)
                .await
                .unwrap_or_else(|e| panic!("link {}: {}", name, e));
        }

        self.workspace
            .navigate_to("/")
            .await
            .unwrap_or_else(|e| panic!("navigate root: {}", e));
    }

    /// Swaps the failure policy and clears the call log
    pub fn fail_with(&self, policy: FailurePolicy) {
        self.backend.set_policy(policy);
    }

    /// Fails one operation on the listed keys
    pub fn fail_on(&self, op: services_storage::BackendOp, keys: &[&str]) {
        self.fail_with(FailurePolicy::OnKeys {
            op,
            keys: keys.iter().map(|k| k.to_string()).collect(),
        });
    }
}
