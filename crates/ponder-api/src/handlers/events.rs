use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;

use super::json_event;
use crate::{
    error::{ApiError, ApiResult},
    routes::{messages::ListMessagesResponse, threads::ListThreadsResponse},
    state::AppState,
};

fn error_event(error: &ponder_persist::PersistError) -> Event {
    tracing::warn!(error = %error, "Subscription failed");
    Event::default().event("error").data(error.to_string())
}

/// Live thread list: the current list first, then one event per change
#[utoipa::path(
    get,
    path = "/threads/events",
    responses(
        (status = 200, description = "Thread list snapshots", content_type = "text/event-stream")
    ),
    tag = "threads"
)]
pub async fn thread_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = state.store.subscribe_threads().map(|snapshot| {
        Ok::<Event, Infallible>(match snapshot {
            Ok(threads) => json_event("threads", &ListThreadsResponse::from(threads)),
            Err(e) => error_event(&e),
        })
    });

    Sse::new(snapshots).keep_alive(KeepAlive::default())
}

/// Live message list of one thread
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/messages/events",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Message list snapshots", content_type = "text/event-stream"),
        (status = 404, description = "Thread not found")
    ),
    tag = "messages"
)]
pub async fn message_events(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if state.store.get_thread(&thread_id).await?.is_none() {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    let snapshots = state.store.subscribe_messages(&thread_id).map(|snapshot| {
        Ok::<Event, Infallible>(match snapshot {
            Ok(messages) => json_event("messages", &ListMessagesResponse::from(messages)),
            Err(e) => error_event(&e),
        })
    });

    Ok(Sse::new(snapshots).keep_alive(KeepAlive::default()))
}
