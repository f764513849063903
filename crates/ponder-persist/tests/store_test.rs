use async_trait::async_trait;
use futures::StreamExt;
use ponder_persist::{
    LocalStore, MessageRole, NewMessage, PersistError, PersistenceClient, QueryKey,
    QuerySnapshot, Snapshot, SnapshotSink,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Sink that can be switched to fail every write
#[derive(Default)]
struct FlakySink {
    failing: AtomicBool,
}

#[async_trait]
impl SnapshotSink for FlakySink {
    async fn load(&self) -> ponder_persist::Result<Option<Snapshot>> {
        Ok(None)
    }

    async fn write(&self, _snapshot: &Snapshot) -> ponder_persist::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_threads_ordered_by_recent_activity() {
    let store = LocalStore::in_memory();
    let a = store.create_thread("a").await.unwrap();
    let b = store.create_thread("b").await.unwrap();
    let c = store.create_thread("c").await.unwrap();

    let ids: Vec<_> = store.list_threads().await.unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![c.clone(), b.clone(), a.clone()]);

    store.create_message(NewMessage::user(a.clone(), "bump")).await.unwrap();

    let threads = store.list_threads().await.unwrap();
    let ids: Vec<_> = threads.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec![a, c, b]);
    for pair in threads.windows(2) {
        assert!(pair[0].updated_at > pair[1].updated_at);
    }
}

#[tokio::test]
async fn test_messages_strictly_ascending() {
    let store = LocalStore::in_memory();
    let thread = store.create_thread("Test").await.unwrap();

    let mut created = Vec::new();
    for i in 0..50 {
        created.push(
            store
                .create_message(NewMessage::user(thread.clone(), format!("m{i}")))
                .await
                .unwrap(),
        );
    }

    let messages = store.list_messages(&thread).await.unwrap();
    let ids: Vec<_> = messages.iter().map(|m| m.id.clone()).collect();
    assert_eq!(ids, created);
    for pair in messages.windows(2) {
        assert!(pair[0].created_at < pair[1].created_at);
    }
}

#[tokio::test]
async fn test_message_ids_unique_across_threads() {
    let store = LocalStore::in_memory();
    let t1 = store.create_thread("one").await.unwrap();
    let t2 = store.create_thread("two").await.unwrap();

    let m1 = store.create_message(NewMessage::user(t1.clone(), "x")).await.unwrap();
    let m2 = store.create_message(NewMessage::user(t2.clone(), "x")).await.unwrap();

    assert_ne!(m1, m2);
    assert_ne!(t1, t2);
    assert_eq!(store.list_messages(&t1).await.unwrap().len(), 1);
    assert_eq!(store.list_messages(&t2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_title_thread() {
    let store = LocalStore::in_memory();
    let id = store.create_thread("").await.unwrap();

    let thread = store.get_thread(&id).await.unwrap().unwrap();
    assert_eq!(thread.title, "");
    assert_eq!(thread.created_at, thread.updated_at);
    assert_eq!(store.list_threads().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_write_leaves_thread_untouched() {
    let sink = Arc::new(FlakySink::default());
    let store = LocalStore::builder().sink(sink.clone()).build().await.unwrap();
    let thread_id = store.create_thread("Test").await.unwrap();
    let before = store.get_thread(&thread_id).await.unwrap().unwrap();

    sink.failing.store(true, Ordering::SeqCst);
    let err = store
        .create_message(NewMessage::user(thread_id.clone(), "Hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, PersistError::Io(_)));

    let after = store.get_thread(&thread_id).await.unwrap().unwrap();
    assert_eq!(after.updated_at, before.updated_at);
    assert!(store.list_messages(&thread_id).await.unwrap().is_empty());

    // Recovers once storage works again
    sink.failing.store(false, Ordering::SeqCst);
    store
        .create_message(NewMessage::user(thread_id.clone(), "Hi"))
        .await
        .unwrap();
    assert_eq!(store.list_messages(&thread_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_message_for_unknown_thread_is_rejected() {
    let store = LocalStore::in_memory();
    let err = store
        .create_message(NewMessage::user("no-such-thread", "Hi"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(store.list_messages("no-such-thread").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reopen_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ponder.json");

    let (thread_id, listed) = {
        let store = LocalStore::open(&path).await.unwrap();
        let thread_id = store.create_thread("Test").await.unwrap();
        store.create_message(NewMessage::user(thread_id.clone(), "Hi")).await.unwrap();
        store
            .create_message(NewMessage::assistant(thread_id.clone(), "Hello!", "because"))
            .await
            .unwrap();
        let listed = store.list_messages(&thread_id).await.unwrap();
        store.close().await.unwrap();
        (thread_id, listed)
    };

    let reopened = LocalStore::open(&path).await.unwrap();
    assert_eq!(reopened.list_messages(&thread_id).await.unwrap(), listed);

    let next = reopened
        .create_message(NewMessage::user(thread_id.clone(), "again"))
        .await
        .unwrap();
    let messages = reopened.list_messages(&thread_id).await.unwrap();
    assert_eq!(messages.last().unwrap().id, next);
    assert!(messages[2].created_at > messages[1].created_at);
    assert_eq!(messages[1].role, MessageRole::Assistant);
}

#[tokio::test]
async fn test_closed_store_rejects_calls() {
    let store = LocalStore::in_memory();
    store.create_thread("x").await.unwrap();
    store.close().await.unwrap();

    assert!(store.is_closed());
    assert!(matches!(store.list_threads().await, Err(PersistError::Closed)));
    assert!(matches!(store.create_thread("y").await, Err(PersistError::Closed)));
    // Closing twice is harmless
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_thread_subscription_sees_new_activity() {
    let store = LocalStore::in_memory();
    let first = store.create_thread("first").await.unwrap();
    let mut threads = store.subscribe_threads();

    let initial = threads.next().await.unwrap().unwrap();
    assert_eq!(initial.len(), 1);

    let second = store.create_thread("second").await.unwrap();
    let update = threads.next().await.unwrap().unwrap();
    assert_eq!(update[0].id, second);

    store.create_message(NewMessage::user(first.clone(), "Hi")).await.unwrap();
    let update = threads.next().await.unwrap().unwrap();
    assert_eq!(update[0].id, first);
}

#[tokio::test]
async fn test_message_subscription_filters_other_threads() {
    let store = LocalStore::in_memory();
    let watched = store.create_thread("watched").await.unwrap();
    let other = store.create_thread("other").await.unwrap();

    let mut stream = store.subscribe(QueryKey::Messages(watched.clone()));
    match stream.next().await.unwrap().unwrap() {
        QuerySnapshot::Messages(messages) => assert!(messages.is_empty()),
        other => panic!("Expected messages snapshot, got {:?}", other),
    }

    store.create_message(NewMessage::user(other, "elsewhere")).await.unwrap();
    store.create_message(NewMessage::user(watched.clone(), "here")).await.unwrap();

    match stream.next().await.unwrap().unwrap() {
        QuerySnapshot::Messages(messages) => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].content, "here");
        }
        other => panic!("Expected messages snapshot, got {:?}", other),
    }
}

#[tokio::test]
async fn test_subscription_ends_on_close() {
    let store = LocalStore::in_memory();
    let mut stream = store.subscribe(QueryKey::Threads);
    assert!(stream.next().await.is_some());

    store.close().await.unwrap();

    let end = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("subscription should end after close");
    assert!(end.is_none());
}

#[tokio::test]
async fn test_store_works_through_trait_object() {
    let store: Arc<dyn PersistenceClient> = Arc::new(LocalStore::in_memory());
    let id = store.create_thread("dyn").await.unwrap();
    store.create_message(NewMessage::user(id.clone(), "Hi")).await.unwrap();

    let mut messages = store.subscribe_messages(&id);
    assert_eq!(messages.next().await.unwrap().unwrap().len(), 1);
}
