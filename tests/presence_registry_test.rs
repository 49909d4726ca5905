//! Tests for the connection registry

use std::collections::HashSet;
use std::sync::Arc;

use chatrelay::ConnectionRegistry;

#[tokio::test]
async fn snapshot_matches_identify_disconnect_history() {
    let registry = ConnectionRegistry::new();

    // c1, c2, c3 identify; c2 disconnects; c4 identifies and disconnects.
    registry
        .upsert("c1".to_string(), "Ana".to_string(), "/a.png".to_string())
        .await;
    registry
        .upsert("c2".to_string(), "Leo".to_string(), "/l.png".to_string())
        .await;
    registry
        .upsert("c3".to_string(), "Bia".to_string(), "/b.png".to_string())
        .await;
    assert!(registry.remove("c2").await);
    registry
        .upsert("c4".to_string(), "Rui".to_string(), "/r.png".to_string())
        .await;
    assert!(registry.remove("c4").await);

    let ids: HashSet<String> = registry
        .snapshot()
        .await
        .into_iter()
        .map(|record| record.conn_id)
        .collect();

    let expected: HashSet<String> = ["c1", "c3"].iter().map(|s| s.to_string()).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn reidentify_keeps_snapshot_size_constant() {
    let registry = ConnectionRegistry::new();
    registry
        .upsert("c1".to_string(), "Ana".to_string(), "/a.png".to_string())
        .await;
    assert_eq!(registry.len().await, 1);

    registry
        .upsert("c1".to_string(), "Ana Maria".to_string(), "/new.png".to_string())
        .await;

    let snapshot = registry.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].display_name, "Ana Maria");
    assert_eq!(snapshot[0].avatar_url, "/new.png");
}

#[tokio::test]
async fn removing_unknown_connection_is_a_noop() {
    let registry = ConnectionRegistry::new();
    assert!(!registry.remove("ghost").await);
    assert!(registry.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_lifecycles_leave_no_stale_entries() {
    let registry = Arc::new(ConnectionRegistry::new());

    // Even-numbered connections identify and stay; odd-numbered ones
    // identify and then disconnect. Interleaving is up to the scheduler.
    let mut handles = Vec::new();
    for i in 0..64usize {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            let conn_id = format!("c{}", i);
            registry
                .upsert(conn_id.clone(), format!("user-{}", i), String::new())
                .await;
            if i % 2 == 1 {
                assert!(registry.remove(&conn_id).await);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let ids: HashSet<String> = registry
        .snapshot()
        .await
        .into_iter()
        .map(|record| record.conn_id)
        .collect();
    let expected: HashSet<String> = (0..64usize)
        .filter(|i| i % 2 == 0)
        .map(|i| format!("c{}", i))
        .collect();
    assert_eq!(ids, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reidentify_of_one_connection_keeps_a_single_record() {
    let registry = Arc::new(ConnectionRegistry::new());

    let mut handles = Vec::new();
    for i in 0..32usize {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry
                .upsert("c1".to_string(), format!("name-{}", i), String::new())
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Last write wins; which write was last is scheduler-dependent, but
    // there must be exactly one record and it must be one of the writes.
    let snapshot = registry.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot[0].display_name.starts_with("name-"));
}
