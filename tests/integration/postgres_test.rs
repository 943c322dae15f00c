//! Integration tests against the PostgreSQL backends.
//!
//! Set `QUOTEVER_TEST_DATABASE_URL` to run them; each test returns early
//! otherwise. Every test works on fresh document ids, so a shared database
//! is fine.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use quotever_core::ErrorKind;
use quotever_core::types::id::{DocumentId, UserId};
use quotever_database::{DocumentOwner, PgVersionStore, VersionStore};
use quotever_entity::change::ChangeType;
use quotever_entity::document::DocumentState;
use quotever_entity::value::Value;
use quotever_entity::version::{NewVersion, VersionState};
use quotever_service::codec;

fn new_version(document_id: DocumentId, state: &DocumentState, user: UserId) -> NewVersion {
    let snapshot_data = codec::encode(state);
    NewVersion {
        document_id,
        content_hash: codec::content_hash(&snapshot_data),
        snapshot_data,
        version_name: None,
        change_reason: None,
        created_by: user,
    }
}

#[tokio::test]
async fn test_pg_version_lifecycle() {
    let Some(app) = helpers::PgTestApp::connect().await else {
        return;
    };
    let q1 = app.seed(&helpers::sample_quotation()).await;

    let v1 = app.snapshot(q1, "v1").await;
    assert_eq!(v1.version_number, 1);
    assert!(!v1.is_active);
    let v1 = app.manager.activate_version(q1, 1).await.expect("activate v1");
    assert!(v1.is_active);
    assert!(v1.activated_at.is_some());

    app.set_unit_price(q1, 7, 120).await;
    let v2 = app.snapshot(q1, "v2").await;
    assert_eq!(v2.version_number, 2);
    assert!(!v2.is_active);
    app.manager.activate_version(q1, 2).await.expect("activate v2");

    let listed = app.list(q1).await;
    assert_eq!(helpers::single_active(&listed).map(|v| v.id), Some(v2.id));
    let first = listed.iter().find(|v| v.id == v1.id).expect("v1 listed");
    assert_eq!(first.state(), VersionState::Superseded);

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
}

#[tokio::test]
async fn test_pg_rollback_and_delete() {
    let Some(app) = helpers::PgTestApp::connect().await else {
        return;
    };
    let q1 = app.seed(&helpers::sample_quotation()).await;
    let v1 = app.snapshot(q1, "v1").await;
    app.set_unit_price(q1, 7, 120).await;
    let v2 = app.snapshot(q1, "v2").await;
    app.manager.activate_version(q1, 2).await.expect("activate v2");

    let v3 = app
        .manager
        .rollback_to_version(q1, v1.id, Some("revert pricing error".to_string()), app.user)
        .await
        .expect("rollback");
    assert_eq!(v3.version_number, 3);
    assert!(v3.is_active);
    assert_eq!(v3.change_reason.as_deref(), Some("revert pricing error"));
    assert_eq!(v3.content_hash, v1.content_hash);
    assert_eq!(
        app.live_state(q1).await,
        app.manager.decode_version(v1.id).await.expect("decode v1")
    );
    let listed = app.list(q1).await;
    assert_eq!(helpers::single_active(&listed).map(|v| v.id), Some(v3.id));

    let err = app.manager.delete_version(v3.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    app.manager.delete_version(v1.id).await.expect("delete v1");
    let numbers: Vec<i32> = app.list(q1).await.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![2, 3]);

    let err = app.manager.get_version(v1.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let v4 = app.snapshot(q1, "v4").await;
    assert_eq!(v4.version_number, 4);
    let listed = app.list(q1).await;
    assert_eq!(
        listed.iter().map(|v| v.id).collect::<Vec<_>>(),
        vec![v2.id, v3.id, v4.id]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pg_concurrent_creates_get_unique_numbers() {
    let Some(app) = helpers::PgTestApp::connect().await else {
        return;
    };
    let state = helpers::sample_quotation();
    let q1 = app.seed(&state).await;

    // Straight to the store: the row lock, not the manager, must serialize.
    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = PgVersionStore::new(app.db.pool().clone());
        let new = new_version(q1, &state, app.user);
        handles.push(tokio::spawn(async move {
            store.create(new).await.expect("create").version_number
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        assert!(numbers.insert(handle.await.expect("join")));
    }
    assert_eq!(numbers, (1..=16).collect::<HashSet<i32>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pg_concurrent_activations_leave_one_active() {
    let Some(app) = helpers::PgTestApp::connect().await else {
        return;
    };
    let q1 = app.seed(&helpers::sample_quotation()).await;
    for i in 0..6 {
        app.snapshot(q1, &format!("v{i}")).await;
    }

    let store = Arc::new(app.versions.clone());
    let mut handles = Vec::new();
    for round in 0..24 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .set_active(q1, (round % 6) + 1)
                .await
                .expect("activate")
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }

    let listed = app.list(q1).await;
    assert_eq!(listed.iter().filter(|v| v.is_active).count(), 1);
    let active = app
        .manager
        .get_active_version(q1)
        .await
        .expect("active")
        .expect("one active");
    assert_eq!(helpers::single_active(&listed).map(|v| v.id), Some(active.id));
}

#[tokio::test]
async fn test_pg_large_numbers_keep_their_hash() {
    let Some(app) = helpers::PgTestApp::connect().await else {
        return;
    };
    let state = DocumentState::try_from(json!({
        "total": 1e16,
        "units": 10_000_000_000_000_000_i64,
        "rate": 0.1,
        "discount": 1.5e-7
    }))
    .expect("object");
    let q1 = app.seed(&state).await;
    assert_eq!(app.live_state(q1).await, state);

    let v1 = app.snapshot(q1, "big").await;
    let decoded = app.manager.decode_version(v1.id).await.expect("decode");
    assert_eq!(decoded, state);

    let fetched = app.manager.get_version(v1.id).await.expect("get");
    assert_eq!(codec::content_hash(&fetched.snapshot_data), v1.content_hash);
    assert!(app.manager.diff_against_live(q1, v1.id).await.expect("drift").is_empty());
}

#[tokio::test]
async fn test_pg_snapshots_are_write_once() {
    let Some(app) = helpers::PgTestApp::connect().await else {
        return;
    };
    let q1 = app.seed(&helpers::sample_quotation()).await;
    let v1 = app.snapshot(q1, "v1").await;

    let rewrite = sqlx::query("UPDATE quotation_versions SET snapshot_data = '{}'::json WHERE id = $1")
        .bind(v1.id)
        .execute(app.db.pool())
        .await;
    assert!(rewrite.is_err());

    let rehash = sqlx::query("UPDATE quotation_versions SET content_hash = 'x' WHERE id = $1")
        .bind(v1.id)
        .execute(app.db.pool())
        .await;
    assert!(rehash.is_err());

    let stored = app.manager.get_version(v1.id).await.expect("get");
    assert_eq!(stored.snapshot_data, v1.snapshot_data);
    assert_eq!(stored.content_hash, v1.content_hash);
}

#[tokio::test]
async fn test_pg_document_store() {
    let Some(app) = helpers::PgTestApp::connect().await else {
        return;
    };
    let unknown = DocumentId::new();
    assert!(!app.documents.exists(unknown).await.expect("exists"));

    let err = app.documents.read_state(unknown).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app
        .documents
        .write_state(unknown, &helpers::sample_quotation())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app.manager.list_versions(unknown).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let q1 = app.seed(&helpers::sample_quotation()).await;
    assert!(app.documents.exists(q1).await.expect("exists"));
    app.set_unit_price(q1, 8, 4).await;

    let mut expected = helpers::sample_quotation();
    helpers::set_item_price(&mut expected, 8, 4);
    assert_eq!(app.live_state(q1).await, expected);

    // Upsert replaces the whole state.
    app.documents
        .upsert(q1, &helpers::sample_quotation())
        .await
        .expect("upsert");
    assert_eq!(app.live_state(q1).await, helpers::sample_quotation());
}

#[tokio::test]
async fn test_pg_migrations_are_idempotent() {
    let Some(app) = helpers::PgTestApp::connect().await else {
        return;
    };
    app.db.migrate().await.expect("second migrate");
    assert!(app.db.health_check().await.expect("health"));
}
