use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use super::json_event;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Send a message and stream the reply using Server-Sent Events
///
/// Events are `init_stream`, `reasoning` and `message` (accumulated live
/// buffers), then `done` or `error`, and finally `end_stream`. Closing the
/// connection cancels the turn.
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Thread not found"),
        (status = 409, description = "A turn is already running on this thread")
    ),
    tag = "messages"
)]
pub async fn send_message_stream(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Message content is empty".to_string()));
    }

    if state.store.get_thread(&thread_id).await?.is_none() {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    let handle = state.runner.run_streaming_turn(&thread_id, &req.content).await?;
    tracing::info!(
        run_id = %handle.run_id,
        thread_id = %thread_id,
        user_message_id = %handle.user_message_id,
        "Streaming turn to client"
    );

    // The turn keeps running detached; its outcome reaches the client as events
    let (mut events, cancel, _join) = handle.into_parts();

    // Dropped with the response body, even one that is never polled; cancelling
    // a finished turn is a no-op
    let disconnect = cancel.drop_guard();

    let sse_stream = async_stream::stream! {
        let _disconnect = disconnect;

        while let Some(event) = events.recv().await {
            yield Ok::<Event, Infallible>(json_event(event.kind(), &event));
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

/// Cancel the turn running on a thread
#[utoipa::path(
    delete,
    path = "/threads/{thread_id}/turn",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 204, description = "Turn cancelled"),
        (status = 404, description = "No turn in progress")
    ),
    tag = "messages"
)]
pub async fn cancel_turn(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.runner.cancel(&thread_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NoActiveTurn(thread_id))
    }
}
