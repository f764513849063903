use async_trait::async_trait;
use futures::StreamExt;

use crate::error::Result;
use crate::models::{Message, MessageId, NewMessage, Thread, ThreadId};
use crate::subscription::{MessagesStream, QueryKey, QuerySnapshot, SnapshotStream, ThreadsStream};

/// Thread/message storage operations
///
/// The store is the single source of truth. Every write either commits fully
/// or leaves no trace, and failures are returned to the caller.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Create a thread; any title is accepted, including an empty one
    async fn create_thread(&self, title: &str) -> Result<ThreadId>;

    /// Get a thread by ID
    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// All threads, most recently active first
    async fn list_threads(&self) -> Result<Vec<Thread>>;

    /// Insert a message and bump its thread's `updated_at` in one atomic write
    async fn create_message(&self, message: NewMessage) -> Result<MessageId>;

    /// Messages of a thread, oldest first
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>>;

    /// Live result sets for `key`: the current one first, then one per relevant write.
    /// Dropping the stream unsubscribes.
    fn subscribe(&self, key: QueryKey) -> SnapshotStream;

    /// Flush and release the store; later calls fail with `PersistError::Closed`
    async fn close(&self) -> Result<()>;

    fn subscribe_threads(&self) -> ThreadsStream {
        Box::pin(self.subscribe(QueryKey::Threads).filter_map(|snapshot| async move {
            match snapshot {
                Ok(QuerySnapshot::Threads(threads)) => Some(Ok(threads)),
                Ok(QuerySnapshot::Messages(_)) => None,
                Err(e) => Some(Err(e)),
            }
        }))
    }

    fn subscribe_messages(&self, thread_id: &str) -> MessagesStream {
        let key = QueryKey::Messages(thread_id.to_string());
        Box::pin(self.subscribe(key).filter_map(|snapshot| async move {
            match snapshot {
                Ok(QuerySnapshot::Messages(messages)) => Some(Ok(messages)),
                Ok(QuerySnapshot::Threads(_)) => None,
                Err(e) => Some(Err(e)),
            }
        }))
    }
}
