use futures::StreamExt;
use ponder_llm::{ChunkStream, Role};
use ponder_types::StreamEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SessionError};
use crate::parser::{SegmentedReply, ThinkParser};

/// Consume one model response, emitting live buffers as they grow.
///
/// Stops at the end of the stream, on the first `done` chunk, on a transport
/// error or when `cancel` fires. Only the first case yields a reply.
pub async fn segment_stream(
    mut chunks: ChunkStream,
    cancel: &CancellationToken,
    events: &mpsc::Sender<StreamEvent>,
) -> Result<SegmentedReply> {
    let mut parser = ThinkParser::new();
    let mut fragments = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SessionError::Cancelled),
            next = chunks.next() => next,
        };

        let chunk = match next {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                tracing::warn!(fragments, error = %e, "Model stream failed");
                return Err(SessionError::StreamTransport(e.to_string()));
            }
            None => break,
        };

        if chunk.role == Role::Assistant {
            fragments += 1;
            let progress = parser.push(&chunk.content);

            if progress.thought {
                let event = StreamEvent::Reasoning {
                    content: parser.thought().to_string(),
                };
                if !emit(events, cancel, event).await {
                    return Err(SessionError::Cancelled);
                }
            }
            if progress.response {
                let event = StreamEvent::Message {
                    content: parser.response().to_string(),
                };
                if !emit(events, cancel, event).await {
                    return Err(SessionError::Cancelled);
                }
            }
        } else {
            tracing::trace!(role = chunk.role.as_str(), "Skipping non-assistant chunk");
        }

        if chunk.done {
            break;
        }
    }

    if cancel.is_cancelled() {
        return Err(SessionError::Cancelled);
    }

    tracing::debug!(fragments, "Model stream exhausted");
    Ok(parser.finish())
}

/// Send `event`, giving up when `cancel` fires while the channel is full.
///
/// Returns false only on cancellation. A dropped receiver only means nobody
/// is watching. Once cancelled, delivery is best effort and never waits.
pub(crate) async fn emit(
    events: &mpsc::Sender<StreamEvent>,
    cancel: &CancellationToken,
    event: StreamEvent,
) -> bool {
    if cancel.is_cancelled() {
        let _ = events.try_send(event);
        return false;
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = events.send(event) => true,
    }
}
