use axum::response::sse::Event;
use serde::Serialize;

pub mod events;
pub mod stream;

/// SSE event named `name` carrying `data` as JSON
pub(crate) fn json_event<T: Serialize>(name: &str, data: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(data)
        .unwrap_or_else(|e| {
            tracing::warn!(event = name, error = %e, "Failed to encode SSE payload");
            Event::default().event("error").data(e.to_string())
        })
}
