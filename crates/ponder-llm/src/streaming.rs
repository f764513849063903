use anyhow::Result;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::buffer_utils::CircularLineBuffer;
use crate::types::Role;

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk>> + Send>>;

/// One incremental fragment of a model response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChunk {
    pub role: Role,
    pub content: String,
    /// Last chunk of the response
    #[serde(default)]
    pub done: bool,
}

impl ChatChunk {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            done: false,
        }
    }

    pub fn done() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            done: true,
        }
    }
}

/// Line of an Ollama `/api/chat` streaming body
#[derive(Debug, Deserialize)]
struct WireChunk {
    #[serde(default)]
    message: Option<WireMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    role: Role,
    #[serde(default)]
    content: String,
}

/// Parse one NDJSON line into a chunk
pub fn parse_chat_line(line: &str) -> Result<ChatChunk> {
    let wire: WireChunk = serde_json::from_str(line)
        .map_err(|e| anyhow::anyhow!("Failed to parse chat chunk: {}", e))?;

    if let Some(error) = wire.error {
        anyhow::bail!("Model backend error: {}", error);
    }

    if wire.done {
        if let Some(reason) = &wire.done_reason {
            tracing::debug!(done_reason = %reason, "Model stream finished");
        }
    }

    let (role, content) = match wire.message {
        Some(message) => (message.role, message.content),
        None => (Role::Assistant, String::new()),
    };

    Ok(ChatChunk {
        role,
        content,
        done: wire.done,
    })
}

/// Turn a newline-delimited JSON byte stream into chat chunks.
///
/// The stream ends after the first `done` chunk or the first error.
pub fn parse_ndjson_stream<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = CircularLineBuffer::with_capacity(4096);

        while let Some(chunk_result) = byte_chunks.next().await {
            let bytes = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    return;
                }
            };
            buffer.extend(bytes.as_ref());

            while let Some(line_result) = buffer.next_line() {
                let line = match line_result {
                    Ok(line) => line,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                if line.is_empty() {
                    continue;
                }
                match parse_chat_line(&line) {
                    Ok(chunk) => {
                        let done = chunk.done;
                        yield Ok(chunk);
                        if done {
                            return;
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }

        // Body ended without a trailing newline
        if let Some(line_result) = buffer.take_remaining() {
            yield line_result.and_then(|line| parse_chat_line(&line));
        }
    })
}

/// Wrap a response body from the model backend
pub fn parse_response_stream(response: reqwest::Response) -> ChunkStream {
    parse_ndjson_stream(response.bytes_stream())
}
