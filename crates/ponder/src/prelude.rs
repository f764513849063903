//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use ponder::prelude::*;
//! ```

pub use crate::{
    ChatClient, ChatOptions, ChatRequest, ContextPolicy, DBMessage, LocalStore, Message,
    MessageRole, NewMessage, OllamaClient, PersistenceClient, QueryKey, SessionConfig,
    SessionError, StreamEvent, Thread, ThinkParser, TurnHandle, TurnRunner,
};
