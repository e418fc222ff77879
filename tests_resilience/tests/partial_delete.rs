//! Partial Delete Tests
//!
//! Validates that a folder delete attempts every key, reports exactly what
//! was removed, and only drops links for keys that are really gone.

use services_fs_view::{EngineConfig, OperationError};
use services_logger::{ActivityAction, ActivityOutcome};
use services_storage::BackendOp;
use services_workspace_manager::WorkspaceError;
use tests_resilience::Harness;

#[tokio::test]
async fn test_folder_delete_attempts_every_key() {
    let mut h = Harness::new(EngineConfig::default());
    h.seed_linked_folder("Docs", &["a.pdf", "b.pdf", "c.pdf"]).await;
    h.fail_on(BackendOp::Delete, &["Docs/b.pdf"]);

    let folder = h.workspace.entry("Docs").await.unwrap();
    let err = h.workspace.delete(&folder).await.unwrap_err();

    let mut attempted = h.backend.keys_for(BackendOp::Delete);
    attempted.sort();
    assert_eq!(
        attempted,
        vec!["Docs/.folder", "Docs/a.pdf", "Docs/b.pdf", "Docs/c.pdf"]
    );

    assert!(err.needs_cleanup());
    let WorkspaceError::Operation(OperationError::PartialFailure(partial)) = &err else {
        panic!("expected partial failure, got {:?}", err);
    };
    assert_eq!(partial.attempted, 4);
    assert_eq!(partial.failed_keys(), vec!["Docs/b.pdf"]);
    assert_eq!(partial.completed.len(), 3);
}

#[tokio::test]
async fn test_partial_delete_keeps_links_of_survivors() {
    let mut h = Harness::new(EngineConfig::default());
    h.seed_linked_folder("Docs", &["a.pdf", "b.pdf"]).await;
    h.fail_on(BackendOp::Delete, &["Docs/b.pdf"]);

    let folder = h.workspace.entry("Docs").await.unwrap();
    assert!(h.workspace.delete(&folder).await.is_err());

    assert!(h.workspace.link("/Docs/a.pdf").is_none());
    assert!(h.workspace.link("/Docs/b.pdf").is_some());
    assert!(h.backend.inner().contains("Docs/b.pdf").await);

    // The survivor keeps the folder visible even though its marker is gone
    let names: Vec<String> = h
        .workspace
        .listing()
        .folders
        .iter()
        .map(|f| f.name.clone())
        .collect();
    assert_eq!(names, vec!["Docs"]);

    let last = h.workspace.activity().recent(1)[0];
    assert_eq!(last.action, ActivityAction::Delete);
    assert!(matches!(last.outcome, ActivityOutcome::Partial(_)));
    assert_eq!(last.field("deleted"), Some("2"));
}

#[tokio::test]
async fn test_delete_where_everything_fails() {
    let mut h = Harness::new(EngineConfig::default());
    h.seed_linked_folder("Docs", &["a.pdf"]).await;
    h.fail_with(services_storage::FailurePolicy::Always(BackendOp::Delete));

    let folder = h.workspace.entry("Docs").await.unwrap();
    let err = h.workspace.delete(&folder).await.unwrap_err();

    let partial = match &err {
        WorkspaceError::Operation(op) => op.partial().unwrap().clone(),
        other => panic!("expected operation error, got {:?}", other),
    };
    assert!(partial.completed.is_empty());
    assert_eq!(partial.failed_count(), 2);
    assert_eq!(h.workspace.links().len(), 1);
}

#[tokio::test]
async fn test_retry_after_partial_delete_finishes_the_job() {
    let mut h = Harness::new(EngineConfig::default());
    h.seed_linked_folder("Docs", &["a.pdf", "b.pdf"]).await;
    h.fail_on(BackendOp::Delete, &["Docs/b.pdf"]);

    let folder = h.workspace.entry("Docs").await.unwrap();
    assert!(h.workspace.delete(&folder).await.is_err());

    h.fail_with(services_storage::FailurePolicy::Never);
    let folder = h.workspace.entry("Docs").await.unwrap();
    let report = h.workspace.delete(&folder).await.unwrap();
    assert_eq!(report.deleted, vec!["Docs/b.pdf"]);
    assert!(h.workspace.links().is_empty());
    assert!(h.backend.inner().is_empty().await);
}
