//! Integration tests for concurrent writers on one quotation.

mod helpers;

use std::collections::HashSet;

use quotever_entity::version::CreateVersionRequest;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_unique_numbers() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;

    let mut handles = Vec::new();
    for i in 0..32 {
        let manager = app.manager.clone();
        let user = app.user;
        handles.push(tokio::spawn(async move {
            manager
                .create_version(CreateVersionRequest::new(q1, user).named(format!("c{i}")))
                .await
                .expect("create")
                .version_number
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        assert!(numbers.insert(handle.await.expect("join")));
    }
    assert_eq!(numbers, (1..=32).collect::<HashSet<i32>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_activations_leave_one_active() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;
    for i in 0..8 {
        app.snapshot(q1, &format!("v{i}")).await;
    }

    let mut handles = Vec::new();
    for round in 0..64 {
        let manager = app.manager.clone();
        handles.push(tokio::spawn(async move {
            let number = (round % 8) + 1;
            manager.activate_version(q1, number).await.expect("activate");
            let listed = manager.list_versions(q1).await.expect("list");
            assert_eq!(listed.iter().filter(|v| v.is_active).count(), 1);
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }

    let listed = app.list(q1).await;
    assert!(helpers::single_active(&listed).is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rollbacks_and_creates() {
    let app = helpers::TestApp::new();
    let q1 = app.seed_quotation().await;
    let v1 = app.snapshot(q1, "v1").await;
    app.set_unit_price(q1, 7, 250).await;
    let v2 = app.snapshot(q1, "v2").await;
    app.manager.activate_version(q1, 2).await.expect("activate");

    let mut handles = Vec::new();
    for round in 0..16 {
        let manager = app.manager.clone();
        let user = app.user;
        let target = if round % 2 == 0 { v1.id } else { v2.id };
        handles.push(tokio::spawn(async move {
            if round % 3 == 0 {
                manager
                    .create_version(CreateVersionRequest::new(q1, user))
                    .await
                    .map(|v| v.version_number)
            } else {
                manager
                    .rollback_to_version(q1, target, None, user)
                    .await
                    .map(|v| v.version_number)
            }
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("operation");
    }

    let listed = app.list(q1).await;
    let active = helpers::single_active(&listed).expect("one active version");

    // The active version always describes the live document.
    let live = app.live_state(q1).await;
    let decoded = app.manager.decode_version(active.id).await.expect("decode");
    assert_eq!(decoded, live);

    let numbers: Vec<i32> = listed.iter().map(|v| v.version_number).collect();
    let mut sorted = numbers.clone();
    sorted.dedup();
    assert_eq!(numbers, sorted);
}
