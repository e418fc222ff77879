//! Access Control Tests
//!
//! Validates that denied mutations never reach the object store and that
//! reads keep working while writes are failing.

use bytes::Bytes;
use fs_view::Entry;
use services_fs_view::{EngineConfig, OperationError, UploadRequest};
use services_storage::{BackendOp, FailurePolicy};
use services_workspace_manager::WorkspaceError;
use tests_resilience::Harness;

#[tokio::test]
async fn test_viewer_mutations_make_no_object_calls() {
    let mut h = Harness::new(EngineConfig::default());
    h.seed_linked_folder("Docs", &["a.pdf"]).await;
    h.workspace.login("user@example.com").unwrap();
    h.fail_with(FailurePolicy::Never);

    let file = Entry::file("/Docs/a.pdf");
    let folder = Entry::folder("/Docs");

    assert!(matches!(
        h.workspace.create_folder("X").await,
        Err(WorkspaceError::Operation(OperationError::PermissionDenied(_)))
    ));
    assert!(h.workspace.upload("x.txt", Bytes::from_static(b"x"), "").await.is_err());
    assert!(h
        .workspace
        .upload_batch(vec![UploadRequest::new("y.txt", Bytes::from_static(b"y"), "")])
        .await
        .is_err());
    assert!(h.workspace.delete(&folder).await.is_err());
    assert!(h.workspace.rename(&file, "b.pdf").await.is_err());
    h.workspace.copy(file.clone());
    assert!(h.workspace.paste().await.is_err());
    assert!(matches!(
        h.workspace.attach_link("/Docs/a.pdf", "https://youtu.be/x", "").await,
        Err(WorkspaceError::PermissionDenied(_))
    ));
    assert!(matches!(
        h.workspace.remove_link("/Docs/a.pdf").await,
        Err(WorkspaceError::PermissionDenied(_))
    ));

    for call in h.backend.calls() {
        assert_eq!(call.op, BackendOp::List, "unexpected {} {}", call.op, call.key);
    }
    assert!(h.workspace.link("/Docs/a.pdf").is_some());
}

#[tokio::test]
async fn test_reads_survive_failing_writes() {
    let mut h = Harness::new(EngineConfig::default());
    h.seed_linked_folder("Docs", &["a.pdf"]).await;
    h.fail_with(FailurePolicy::AfterWrites(0));

    h.workspace.logout();
    let data = h.workspace.download("/Docs/a.pdf").await.unwrap();
    assert_eq!(&data.body[..], b"a.pdf");

    let listing = h.workspace.navigate_to("/Docs").await.unwrap();
    assert_eq!(listing.files.len(), 1);
    assert_eq!(
        listing.files[0].youtube_link.as_ref().unwrap().title,
        "a.pdf"
    );
}

#[tokio::test]
async fn test_one_failed_upload_does_not_sink_the_batch() {
    let mut h = Harness::new(EngineConfig::default());
    h.fail_on(BackendOp::Put, &["b.txt"]);

    let report = h
        .workspace
        .upload_batch(vec![
            UploadRequest::new("a.txt", Bytes::from_static(b"a"), ""),
            UploadRequest::new("b.txt", Bytes::from_static(b"b"), ""),
            UploadRequest::new("c.txt", Bytes::from_static(b"c"), ""),
        ])
        .await
        .unwrap();

    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "/b.txt");
    assert_eq!(h.workspace.listing().files.len(), 2);
}
