use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use ponder_persist::Thread;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateThreadRequest {
    /// Any text, including empty
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Thread> for ThreadResponse {
    fn from(thread: Thread) -> Self {
        Self {
            thread_id: thread.id,
            title: thread.title,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListThreadsResponse {
    /// Most recently active first
    pub threads: Vec<ThreadResponse>,
}

impl From<Vec<Thread>> for ListThreadsResponse {
    fn from(threads: Vec<Thread>) -> Self {
        Self {
            threads: threads.into_iter().map(ThreadResponse::from).collect(),
        }
    }
}

/// Create a new thread
#[utoipa::path(
    post,
    path = "/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadResponse)
    ),
    tag = "threads"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    let thread_id = state.store.create_thread(&req.title).await?;
    let thread = state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id))?;

    Ok((StatusCode::CREATED, Json(thread.into())))
}

/// List all threads, most recently active first
#[utoipa::path(
    get,
    path = "/threads",
    responses(
        (status = 200, description = "List of threads", body = ListThreadsResponse)
    ),
    tag = "threads"
)]
pub async fn list_threads(State(state): State<Arc<AppState>>) -> ApiResult<Json<ListThreadsResponse>> {
    let threads = state.store.list_threads().await?;
    Ok(Json(threads.into()))
}

/// Get a specific thread by ID
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread details", body = ThreadResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadResponse>> {
    let thread = state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id))?;

    Ok(Json(thread.into()))
}
