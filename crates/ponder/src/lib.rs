//! # Ponder
//!
//! Local-first chat threads backed by a locally hosted reasoning model.
//!
//! ## Overview
//!
//! - **Threads and messages** live in a local store with atomic writes and
//!   live query subscriptions
//! - **Streaming turns** send the latest user message to an Ollama-compatible
//!   backend and consume the reply incrementally
//! - **Reasoning separation** splits the reply into the `<think>` thought and
//!   the final answer, even when markers are split across fragments
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ponder::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn PersistenceClient> = Arc::new(LocalStore::open("ponder.json").await?);
//!     let client: Arc<dyn ChatClient> = Arc::new(OllamaClient::local()?);
//!     let runner = TurnRunner::new(Arc::clone(&store), client, SessionConfig::default());
//!
//!     let thread_id = store.create_thread("Test").await?;
//!     let mut turn = runner.run_streaming_turn(&thread_id, "Hi").await?;
//!
//!     while let Some(event) = turn.events.recv().await {
//!         match event {
//!             StreamEvent::Reasoning { content } => println!("thinking: {}", content),
//!             StreamEvent::Message { content } => println!("answer: {}", content),
//!             _ => {}
//!         }
//!     }
//!
//!     let message_id = turn.join().await?;
//!     println!("persisted {}", message_id);
//!     store.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`ponder-types`**: live stream events and session configuration
//! - **`ponder-llm`**: `ChatClient` trait and the Ollama NDJSON client
//! - **`ponder-persist`**: thread/message store with subscriptions
//! - **`ponder-session`**: `<think>` parser and the turn runner
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use ponder_types::{ContextPolicy, SessionConfig, StreamEvent, TurnStatus, DEFAULT_MODEL};

pub use ponder_llm::{
    ChatChunk, ChatClient, ChatOptions, ChatRequest, ChatResponse, ChunkStream, Message,
    OllamaClient, Role,
};

pub use ponder_persist::{
    LocalStore, LocalStoreBuilder, Message as DBMessage, MessageId, MessageRole, NewMessage,
    PersistError, PersistenceClient, QueryKey, QuerySnapshot, Thread, ThreadId,
};

pub use ponder_session::{
    strip_think_markers, SegmentedReply, SessionError, ThinkParser, TurnHandle, TurnRunner,
};
