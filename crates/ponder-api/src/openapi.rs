use axum::Json;
use utoipa::OpenApi;

use crate::handlers::{events, stream};
use crate::routes::{health, messages, threads};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ponder API",
        description = "Threads, messages and streaming turns against a local reasoning model"
    ),
    paths(
        health::health_check,
        threads::create_thread,
        threads::list_threads,
        threads::get_thread,
        messages::list_messages,
        stream::send_message_stream,
        stream::cancel_turn,
        events::thread_events,
        events::message_events,
    ),
    components(schemas(
        health::HealthResponse,
        threads::CreateThreadRequest,
        threads::ThreadResponse,
        threads::ListThreadsResponse,
        messages::MessageResponse,
        messages::ListMessagesResponse,
        stream::SendMessageRequest,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "threads", description = "Conversation threads"),
        (name = "messages", description = "Messages and streaming turns")
    )
)]
pub struct ApiDoc;

/// OpenAPI document for the routes above
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
