use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::db_thread::ThreadId;

pub type MessageId = String;

/// Stored message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub role: MessageRole,
    pub content: String,
    /// Reasoning text; empty for user messages
    #[serde(default)]
    pub thought: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Input of `create_message`; id and timestamp are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub role: MessageRole,
    pub content: String,
    pub thread_id: ThreadId,
    #[serde(default)]
    pub thought: String,
}

impl NewMessage {
    pub fn user(thread_id: impl Into<ThreadId>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            thread_id: thread_id.into(),
            thought: String::new(),
        }
    }

    pub fn assistant(
        thread_id: impl Into<ThreadId>,
        content: impl Into<String>,
        thought: impl Into<String>,
    ) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            thread_id: thread_id.into(),
            thought: thought.into(),
        }
    }
}

// Conversion: stored Message → ponder_llm::Message
// The thought is never replayed to the model.
impl From<&Message> for ponder_llm::Message {
    fn from(msg: &Message) -> Self {
        match msg.role {
            MessageRole::User => ponder_llm::Message::human(msg.content.clone()),
            MessageRole::Assistant => ponder_llm::Message::ai(msg.content.clone()),
        }
    }
}
