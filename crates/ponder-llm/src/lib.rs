pub mod buffer_utils;
pub mod ollama;
pub mod streaming;
pub mod traits;
pub mod types;

pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse};

pub use buffer_utils::CircularLineBuffer;
pub use ollama::OllamaClient;
pub use streaming::{parse_chat_line, parse_ndjson_stream, ChatChunk, ChunkStream};
pub use types::{Message, Role};
