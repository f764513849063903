use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use super::sink::{JsonFileSink, MemorySink, SnapshotSink};
use super::state::StoreState;
use crate::error::{PersistError, Result};
use crate::models::{Message, MessageId, NewMessage, Thread, ThreadId};
use crate::subscription::{Change, QueryKey, QuerySnapshot, SnapshotStream};
use crate::trait_client::PersistenceClient;

pub(crate) const DEFAULT_CHANGE_CAPACITY: usize = 256;

struct Inner {
    state: RwLock<StoreState>,
    sink: Arc<dyn SnapshotSink>,
    changes: broadcast::Sender<Change>,
    closed: AtomicBool,
}

/// Local thread/message store.
///
/// Cheap to clone; all clones share one dataset. Writers are serialized and a
/// write becomes visible only after its snapshot was accepted by the sink.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<Inner>,
}

impl LocalStore {
    /// Open (or create) a store backed by a JSON file
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_sink(Arc::new(JsonFileSink::new(path)), DEFAULT_CHANGE_CAPACITY).await
    }

    /// Ephemeral store, nothing is written to disk
    pub fn in_memory() -> Self {
        Self::from_state(
            StoreState::default(),
            Arc::new(MemorySink),
            DEFAULT_CHANGE_CAPACITY,
        )
    }

    pub fn builder() -> crate::builder::LocalStoreBuilder {
        crate::builder::LocalStoreBuilder::new()
    }

    pub(crate) async fn with_sink(
        sink: Arc<dyn SnapshotSink>,
        change_capacity: usize,
    ) -> Result<Self> {
        let state = match sink.load().await? {
            Some(snapshot) => StoreState::from_snapshot(snapshot)?,
            None => StoreState::default(),
        };
        Ok(Self::from_state(state, sink, change_capacity))
    }

    fn from_state(state: StoreState, sink: Arc<dyn SnapshotSink>, change_capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(change_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                sink,
                changes,
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(PersistError::Closed);
        }
        Ok(())
    }

    /// Apply `mutate` to a staged copy, make it durable, then publish it.
    /// On any error the visible state is unchanged.
    async fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut StoreState) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.inner.state.write().await;
        self.ensure_open()?;

        let mut staged = state.clone();
        let output = mutate(&mut staged)?;
        self.inner.sink.write(&staged.to_snapshot()).await?;
        *state = staged;

        Ok(output)
    }

    fn publish(&self, change: Change) {
        // No receivers is fine
        let _ = self.inner.changes.send(change);
    }

    async fn query(&self, key: &QueryKey) -> Result<QuerySnapshot> {
        match key {
            QueryKey::Threads => Ok(QuerySnapshot::Threads(self.list_threads().await?)),
            QueryKey::Messages(thread_id) => {
                Ok(QuerySnapshot::Messages(self.list_messages(thread_id).await?))
            }
        }
    }
}

#[async_trait]
impl PersistenceClient for LocalStore {
    async fn create_thread(&self, title: &str) -> Result<ThreadId> {
        let id = self.commit(|state| Ok(state.insert_thread(title))).await?;
        tracing::debug!(thread_id = %id, "Thread created");
        self.publish(Change::Threads);
        Ok(id)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let state = self.inner.state.read().await;
        self.ensure_open()?;
        Ok(state.thread(thread_id))
    }

    async fn list_threads(&self) -> Result<Vec<Thread>> {
        let state = self.inner.state.read().await;
        self.ensure_open()?;
        Ok(state.threads_by_recency())
    }

    async fn create_message(&self, message: NewMessage) -> Result<MessageId> {
        let thread_id = message.thread_id.clone();
        let role = message.role;
        let id = self.commit(|state| state.insert_message(message)).await?;
        tracing::debug!(thread_id = %thread_id, message_id = %id, role = ?role, "Message created");
        self.publish(Change::Messages(thread_id));
        Ok(id)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let state = self.inner.state.read().await;
        self.ensure_open()?;
        Ok(state.messages_of(thread_id))
    }

    fn subscribe(&self, key: QueryKey) -> SnapshotStream {
        // Register before the first read so no write slips between the two
        let mut changes = self.inner.changes.subscribe();
        let store = self.clone();

        Box::pin(async_stream::stream! {
            match store.query(&key).await {
                Ok(snapshot) => yield Ok(snapshot),
                Err(PersistError::Closed) => return,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }

            loop {
                match changes.recv().await {
                    Ok(Change::Closed) | Err(broadcast::error::RecvError::Closed) => break,
                    Ok(change) if !key.is_affected_by(&change) => continue,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Subscription lagged, re-reading");
                    }
                }

                match store.query(&key).await {
                    Ok(snapshot) => yield Ok(snapshot),
                    Err(PersistError::Closed) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        })
    }

    async fn close(&self) -> Result<()> {
        let state = self.inner.state.write().await;
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let flushed = self.inner.sink.write(&state.to_snapshot()).await;
        drop(state);

        self.publish(Change::Closed);
        tracing::info!("Store closed");
        flushed
    }
}
