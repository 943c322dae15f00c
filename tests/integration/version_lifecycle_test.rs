//! Integration tests for creating, activating, comparing and deleting versions.

mod helpers;

use quotever_core::ErrorKind;
use quotever_core::types::id::DocumentId;
use quotever_entity::change::ChangeType;
use quotever_entity::value::Value;
use quotever_entity::version::{CreateVersionRequest, VersionState};
use quotever_service::codec;

#[tokio::test]
async fn test_first_version_then_activate() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;

    let v1 = app.snapshot(q1, "v1").await;
    assert_eq!(v1.version_number, 1);
    assert!(!v1.is_active);
    assert_eq!(v1.state(), VersionState::Draft);

    let active = app.manager.activate_version(q1, 1).await.expect("activate");
    assert_eq!(active.id, v1.id);
    assert!(active.is_active);

    let listed = app.list(q1).await;
    assert_eq!(helpers::single_active(&listed).map(|v| v.id), Some(v1.id));
}

#[tokio::test]
async fn test_second_version_supersedes_first() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;
    let v1 = app.snapshot(q1, "v1").await;
    app.manager.activate_version(q1, 1).await.expect("activate v1");

    let v2 = app.snapshot(q1, "v2").await;
    assert_eq!(v2.version_number, 2);
    assert!(!v2.is_active);
    // Creating does not move the active pointer.
    let active = app.manager.get_active_version(q1).await.expect("active");
    assert_eq!(active.map(|v| v.id), Some(v1.id));

    app.manager.activate_version(q1, 2).await.expect("activate v2");

    let listed = app.list(q1).await;
    assert_eq!(helpers::single_active(&listed).map(|v| v.id), Some(v2.id));
    let first = listed.iter().find(|v| v.id == v1.id).expect("v1 listed");
    assert_eq!(first.state(), VersionState::Superseded);
}

#[tokio::test]
async fn test_compare_reports_price_change() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;
    let v1 = app.snapshot(q1, "v1").await;
    app.set_unit_price(q1, 7, 120).await;
    let v2 = app.snapshot(q1, "v2").await;

    let changes = app
        .manager
        .compare_versions(q1, v1.id, v2.id)
        .await
        .expect("compare");
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].field_name, "items[id=7].unitPrice");
    assert_eq!(changes[0].change_type, ChangeType::Modified);
    assert_eq!(changes[0].old_value, Some(Value::from(100_i64)));
    assert_eq!(changes[0].new_value, Some(Value::from(120_i64)));

    let backwards = app
        .manager
        .compare_versions(q1, v2.id, v1.id)
        .await
        .expect("compare backwards");
    assert_eq!(backwards, vec![changes[0].inverse()]);

    let same = app
        .manager
        .compare_versions(q1, v2.id, v2.id)
        .await
        .expect("compare self");
    assert!(same.is_empty());
}

#[tokio::test]
async fn test_delete_guard_and_no_renumbering() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;
    let v1 = app.snapshot(q1, "v1").await;
    let v2 = app.snapshot(q1, "v2").await;
    let v3 = app.snapshot(q1, "v3").await;
    app.manager.activate_version(q1, 3).await.expect("activate v3");

    let before = app.list(q1).await;
    let err = app.manager.delete_version(v3.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(app.list(q1).await, before);

    app.manager.delete_version(v1.id).await.expect("delete v1");

    let listed = app.list(q1).await;
    let numbers: Vec<(i32, _)> = listed.iter().map(|v| (v.version_number, v.id)).collect();
    assert_eq!(numbers, vec![(2, v2.id), (3, v3.id)]);

    let err = app.manager.get_version(v1.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Freed numbers are never handed out again.
    let v4 = app.snapshot(q1, "v4").await;
    assert_eq!(v4.version_number, 4);
}

#[tokio::test]
async fn test_version_numbers_strictly_increase() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;

    let mut last = 0;
    for round in 0..6 {
        let v = app.snapshot(q1, &format!("round {round}")).await;
        assert!(v.version_number > last);
        last = v.version_number;
        if round % 2 == 1 {
            app.manager
                .activate_version(q1, v.version_number)
                .await
                .expect("activate");
        }
    }
    assert_eq!(last, 6);
}

#[tokio::test]
async fn test_validation_limits() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;

    let err = app
        .manager
        .create_version(CreateVersionRequest::new(q1, app.user).named("n".repeat(101)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .manager
        .create_version(CreateVersionRequest::new(q1, app.user).because("r".repeat(501)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    assert!(app.list(q1).await.is_empty());
    assert!(app.versions.is_empty().await);
}

#[tokio::test]
async fn test_unknown_ids() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;
    app.snapshot(q1, "v1").await;

    let err = app.manager.list_versions(DocumentId::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app.manager.activate_version(q1, 42).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .manager
        .delete_version(quotever_core::types::id::VersionId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_versions_of_other_documents_conflict() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;
    let q2 = app.seed_quotation().await;
    let v1 = app.snapshot(q1, "q1 v1").await;
    let w1 = app.snapshot(q2, "q2 v1").await;
    assert_eq!(w1.version_number, 1);

    let err = app
        .manager
        .compare_versions(q1, v1.id, w1.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = app.manager.activate_version_id(q1, w1.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(app.manager.get_active_version(q2).await.expect("active").is_none());
}

#[tokio::test]
async fn test_snapshot_matches_live_encoding() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;
    let v1 = app.snapshot(q1, "v1").await;

    let live = app.live_state(q1).await;
    assert_eq!(v1.snapshot_data, codec::encode(&live));
    assert_eq!(v1.content_hash, codec::content_hash(&v1.snapshot_data));
    assert_eq!(app.manager.decode_version(v1.id).await.expect("decode"), live);
}
