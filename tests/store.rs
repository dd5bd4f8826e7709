//! Redirect store semantics against an in-memory SQLite database.

use redirect_gateway::redirects::{ErrorKind, RedirectStore, RuleId, StoreError};

mod common;

#[tokio::test]
async fn test_create_stores_canonical_paths() {
    let store = common::store().await;

    let id = store.create(" old-page/ ", "new-page").await.unwrap();
    let rule = store.get(id).await.unwrap();

    assert_eq!(rule.old_path, "/old-page");
    assert_eq!(rule.new_path, "/new-page");
    assert_eq!(rule.status, 301);
    assert!(rule.active);
}

#[tokio::test]
async fn test_same_path_never_inserts() {
    let store = common::store().await;

    let err = store.create("/a/", "a").await.unwrap_err();
    assert!(matches!(err, StoreError::SamePath));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_path_rejected() {
    let store = common::store().await;

    assert!(matches!(store.create("   ", "/new").await, Err(StoreError::EmptyPath)));
    assert!(matches!(store.create("/old", "").await, Err(StoreError::EmptyPath)));
}

#[tokio::test]
async fn test_duplicate_old_path_rejected_even_when_inactive() {
    let store = common::store().await;

    let id = store.create("/old", "/new").await.unwrap();
    let err = store.create("/old/", "/other").await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicatePath(ref p) if p == "/old"));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert!(!store.toggle_active(id).await.unwrap());
    assert!(store.create("old", "/other").await.unwrap_err().is_duplicate());
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_creates_admit_one() {
    let store = common::store().await;

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.create("/race", &format!("/target-{i}")).await })
        })
        .collect();
    let mut created = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(e.is_duplicate(), "unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test]
async fn test_update_rules() {
    let store = common::store().await;
    let a = store.create("/a", "/x").await.unwrap();
    store.create("/b", "/y").await.unwrap();

    // Keeping its own old path is not a conflict.
    store.update(a, "/a", "/z").await.unwrap();
    assert_eq!(store.get(a).await.unwrap().new_path, "/z");

    assert!(store.update(a, "/b", "/z").await.unwrap_err().is_duplicate());
    assert!(matches!(store.update(a, "/c", "c/").await, Err(StoreError::SamePath)));
    assert!(matches!(
        store.update(RuleId(999), "/c", "/d").await,
        Err(StoreError::NotFound(RuleId(999)))
    ));

    store.update(a, "/renamed/", "/z").await.unwrap();
    let rule = store.get(a).await.unwrap();
    assert_eq!(rule.old_path, "/renamed");
    assert!(rule.active);
}

#[tokio::test]
async fn test_toggle_flips_only_active() {
    let store = common::store().await;
    let id = store.create("/old", "/new").await.unwrap();
    let before = store.get(id).await.unwrap();

    assert!(!store.toggle_active(id).await.unwrap());
    assert!(store.toggle_active(id).await.unwrap());

    let after = store.get(id).await.unwrap();
    assert_eq!(before, after);
    assert!(matches!(store.toggle_active(RuleId(42)).await, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_and_clear() {
    let store = common::store().await;
    let id = store.create("/one", "/1").await.unwrap();
    store.create("/two", "/2").await.unwrap();
    store.create("/three", "/3").await.unwrap();

    store.delete(id).await.unwrap();
    let err = store.delete(id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(store.clear_all().await.unwrap(), 2);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_newest_first() {
    let store = common::store().await;
    for path in ["/first", "/second", "/third"] {
        store.create(path, "/dest").await.unwrap();
    }

    let olds: Vec<_> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.old_path)
        .collect();
    assert_eq!(olds, vec!["/third", "/second", "/first"]);
}

#[tokio::test]
async fn test_lookup_and_exists() {
    let store = common::store().await;
    let id = store.create("/old", "/new").await.unwrap();

    assert_eq!(store.lookup_active("/old").await.unwrap().unwrap().id, id);
    assert!(store.lookup_active("/missing").await.unwrap().is_none());

    store.toggle_active(id).await.unwrap();
    assert!(store.lookup_active("/old").await.unwrap().is_none());

    assert!(store.exists_by_old_path("/old", None).await.unwrap());
    assert!(!store.exists_by_old_path("/old", Some(id)).await.unwrap());
    assert!(!store.exists_by_old_path("/new", None).await.unwrap());
}

#[tokio::test]
async fn test_stats() {
    let store = common::store().await;
    let id = store.create("/a", "/b").await.unwrap();
    store.create("/c", "/d").await.unwrap();
    store.toggle_active(id).await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.active, 1);
}
