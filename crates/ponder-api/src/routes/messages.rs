use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use ponder_persist::{Message, MessageRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message_id: String,
    pub thread_id: String,
    #[schema(value_type = String, example = "assistant")]
    pub role: MessageRole,
    pub content: String,
    /// Reasoning text; empty for user messages
    pub thought: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            message_id: message.id,
            thread_id: message.thread_id,
            role: message.role,
            content: message.content,
            thought: message.thought,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListMessagesResponse {
    /// Oldest first
    pub messages: Vec<MessageResponse>,
}

impl From<Vec<Message>> for ListMessagesResponse {
    fn from(messages: Vec<Message>) -> Self {
        Self {
            messages: messages.into_iter().map(MessageResponse::from).collect(),
        }
    }
}

/// List messages in a thread
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Messages, oldest first", body = ListMessagesResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ListMessagesResponse>> {
    if state.store.get_thread(&thread_id).await?.is_none() {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    let messages = state.store.list_messages(&thread_id).await?;
    Ok(Json(messages.into()))
}
