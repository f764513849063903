use ponder_llm::{ChatClient, ChatRequest};
use ponder_persist::{MessageId, NewMessage, PersistenceClient, ThreadId};
use ponder_types::{SessionConfig, StreamEvent, TurnStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::{emit, segment_stream};
use crate::error::{Result, SessionError};

type Registry = Arc<Mutex<HashMap<ThreadId, CancellationToken>>>;

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<ThreadId, CancellationToken>> {
    // The map stays consistent even if a holder panicked
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Releases a thread's in-flight slot when the turn ends, however it ends
struct InFlight {
    registry: Registry,
    thread_id: ThreadId,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock(&self.registry).remove(&self.thread_id);
    }
}

/// Drives streaming turns: persists the user message, streams the model
/// reply, and persists the segmented assistant message.
///
/// At most one turn runs per thread at a time.
#[derive(Clone)]
pub struct TurnRunner {
    store: Arc<dyn PersistenceClient>,
    client: Arc<dyn ChatClient>,
    config: SessionConfig,
    in_flight: Registry,
}

/// A running turn
#[derive(Debug)]
pub struct TurnHandle {
    pub run_id: String,
    pub thread_id: ThreadId,
    pub user_message_id: MessageId,
    /// Live events; ends with `StreamEvent::EndStream`
    pub events: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
    join: JoinHandle<Result<MessageId>>,
}

impl TurnHandle {
    /// Stop the turn at the next fragment boundary. Nothing is persisted for the assistant.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the turn; resolves to the persisted assistant message ID
    pub async fn join(self) -> Result<MessageId> {
        self.join
            .await
            .map_err(|e| SessionError::Internal(format!("Turn task failed: {}", e)))?
    }

    pub fn into_parts(
        self,
    ) -> (
        mpsc::Receiver<StreamEvent>,
        CancellationToken,
        JoinHandle<Result<MessageId>>,
    ) {
        (self.events, self.cancel, self.join)
    }
}

impl TurnRunner {
    pub fn new(
        store: Arc<dyn PersistenceClient>,
        client: Arc<dyn ChatClient>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            client,
            config,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PersistenceClient> {
        &self.store
    }

    pub fn is_busy(&self, thread_id: &str) -> bool {
        lock(&self.in_flight).contains_key(thread_id)
    }

    /// Cancel the in-flight turn of `thread_id`; false when there is none
    pub fn cancel(&self, thread_id: &str) -> bool {
        match lock(&self.in_flight).get(thread_id) {
            Some(token) => {
                tracing::info!(thread_id = %thread_id, "Cancelling turn");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Start a turn for `user_text` on `thread_id`.
    ///
    /// The user message is persisted before this returns; the assistant reply
    /// streams in the background through `TurnHandle::events`.
    pub async fn run_streaming_turn(&self, thread_id: &str, user_text: &str) -> Result<TurnHandle> {
        let cancel = CancellationToken::new();
        let slot = self.claim(thread_id, cancel.clone())?;

        if self.store.get_thread(thread_id).await?.is_none() {
            return Err(SessionError::Validation(format!("Thread not found: {}", thread_id)));
        }

        let user_message_id = self
            .store
            .create_message(NewMessage::user(thread_id, user_text))
            .await?;
        let request = self.build_request(thread_id).await?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));

        tracing::info!(
            run_id = %run_id,
            thread_id = %thread_id,
            model = %request.model,
            context_messages = request.messages.len(),
            "Starting turn"
        );

        let store = Arc::clone(&self.store);
        let client = Arc::clone(&self.client);
        let task_cancel = cancel.clone();
        let task_run_id = run_id.clone();
        let task_thread_id = thread_id.to_string();

        let join = tokio::spawn(async move {
            let _slot = slot;
            Self::execute_turn(
                store,
                client,
                request,
                task_run_id,
                task_thread_id,
                task_cancel,
                tx,
            )
            .await
        });

        Ok(TurnHandle {
            run_id,
            thread_id: thread_id.to_string(),
            user_message_id,
            events: rx,
            cancel,
            join,
        })
    }

    fn claim(&self, thread_id: &str, cancel: CancellationToken) -> Result<InFlight> {
        let mut in_flight = lock(&self.in_flight);
        if in_flight.contains_key(thread_id) {
            return Err(SessionError::ThreadBusy(thread_id.to_string()));
        }
        in_flight.insert(thread_id.to_string(), cancel);

        Ok(InFlight {
            registry: Arc::clone(&self.in_flight),
            thread_id: thread_id.to_string(),
        })
    }

    /// Context window per `ContextPolicy`, with the optional system prompt first
    async fn build_request(&self, thread_id: &str) -> Result<ChatRequest> {
        let history = self.store.list_messages(thread_id).await?;
        let start = self.config.context.window_start(history.len());

        let mut messages = Vec::with_capacity(history.len() - start + 1);
        if let Some(prompt) = &self.config.system_prompt {
            messages.push(ponder_llm::Message::system(prompt.clone()));
        }
        messages.extend(history[start..].iter().map(ponder_llm::Message::from));

        Ok(ChatRequest::new(self.config.model.clone(), messages))
    }

    async fn execute_turn(
        store: Arc<dyn PersistenceClient>,
        client: Arc<dyn ChatClient>,
        request: ChatRequest,
        run_id: String,
        thread_id: ThreadId,
        cancel: CancellationToken,
        events: mpsc::Sender<StreamEvent>,
    ) -> Result<MessageId> {
        let start_time = Instant::now();
        emit(&events, &cancel, StreamEvent::init(&run_id, &thread_id)).await;

        let outcome = Self::stream_and_persist(store, client, request, &thread_id, &cancel, &events).await;

        let status = match &outcome {
            Ok(message_id) => {
                let done = StreamEvent::Done {
                    message_id: message_id.clone(),
                };
                emit(&events, &cancel, done).await;
                TurnStatus::Completed
            }
            Err(e) => {
                match e {
                    SessionError::Cancelled => {
                        tracing::info!(run_id = %run_id, thread_id = %thread_id, "Turn cancelled")
                    }
                    _ => {
                        tracing::error!(run_id = %run_id, thread_id = %thread_id, error = %e, "Turn failed")
                    }
                }
                let error = StreamEvent::Error {
                    message: e.to_string(),
                };
                emit(&events, &cancel, error).await;
                e.turn_status()
            }
        };

        let total_duration_ms = start_time.elapsed().as_millis() as u64;
        let end = StreamEvent::EndStream {
            status,
            total_duration_ms,
        };
        emit(&events, &cancel, end).await;

        tracing::debug!(run_id = %run_id, status = ?status, total_duration_ms, "Turn finished");
        outcome
    }

    async fn stream_and_persist(
        store: Arc<dyn PersistenceClient>,
        client: Arc<dyn ChatClient>,
        request: ChatRequest,
        thread_id: &str,
        cancel: &CancellationToken,
        events: &mpsc::Sender<StreamEvent>,
    ) -> Result<MessageId> {
        let chunks = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SessionError::Cancelled),
            opened = client.chat_stream(request) => {
                opened.map_err(|e| SessionError::StreamTransport(e.to_string()))?
            }
        };

        let reply = segment_stream(chunks, cancel, events).await?;

        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }

        let message_id = store
            .create_message(NewMessage::assistant(thread_id, reply.response, reply.thought))
            .await?;

        tracing::debug!(thread_id = %thread_id, message_id = %message_id, "Assistant message persisted");
        Ok(message_id)
    }
}
