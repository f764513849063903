use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;
use crate::models::{Message, Thread, ThreadId};

pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<QuerySnapshot>> + Send>>;
pub type ThreadsStream = Pin<Box<dyn Stream<Item = Result<Vec<Thread>>> + Send>>;
pub type MessagesStream = Pin<Box<dyn Stream<Item = Result<Vec<Message>>> + Send>>;

/// A live query a caller can subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "query", content = "thread_id", rename_all = "snake_case")]
pub enum QueryKey {
    /// `list_threads()`
    Threads,
    /// `list_messages(thread_id)`
    Messages(ThreadId),
}

impl QueryKey {
    pub fn is_affected_by(&self, change: &Change) -> bool {
        match (self, change) {
            (_, Change::Closed) => true,
            (QueryKey::Threads, Change::Threads) => true,
            (QueryKey::Threads, Change::Messages(_)) => true,
            (QueryKey::Messages(key), Change::Messages(thread_id)) => key == thread_id,
            (QueryKey::Messages(_), Change::Threads) => false,
        }
    }
}

/// Result set of a `QueryKey` at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "query", content = "items", rename_all = "snake_case")]
pub enum QuerySnapshot {
    Threads(Vec<Thread>),
    Messages(Vec<Message>),
}

/// Committed write, published on the store's change feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A thread was created
    Threads,
    /// A message was added to this thread (its `updated_at` moved too)
    Messages(ThreadId),
    /// The store was closed; subscriptions end
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_write_affects_thread_list() {
        let change = Change::Messages("t1".to_string());
        assert!(QueryKey::Threads.is_affected_by(&change));
        assert!(QueryKey::Messages("t1".to_string()).is_affected_by(&change));
        assert!(!QueryKey::Messages("t2".to_string()).is_affected_by(&change));
    }

    #[test]
    fn test_thread_creation_does_not_touch_message_lists() {
        assert!(!QueryKey::Messages("t1".to_string()).is_affected_by(&Change::Threads));
        assert!(QueryKey::Messages("t1".to_string()).is_affected_by(&Change::Closed));
    }
}
