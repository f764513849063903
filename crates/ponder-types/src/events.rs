use serde::{Deserialize, Serialize};

/// Live events emitted while a streaming turn runs.
///
/// `Reasoning` and `Message` carry the *accumulated* live buffer, not a delta,
/// so a consumer can simply replace what it displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Turn started
    InitStream {
        run_id: String,
        thread_id: String,
        timestamp: i64,
    },

    /// Live thought buffer
    Reasoning {
        content: String,
    },

    /// Live response buffer
    Message {
        content: String,
    },

    /// Assistant message persisted
    Done {
        message_id: String,
    },

    /// Turn failed; nothing was persisted for the assistant
    Error {
        message: String,
    },

    /// Turn finished. Live buffers must be discarded after this event.
    EndStream {
        status: TurnStatus,
        total_duration_ms: u64,
    },
}

impl StreamEvent {
    pub fn init(run_id: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self::InitStream {
            run_id: run_id.into(),
            thread_id: thread_id.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Name used for the SSE `event:` field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitStream { .. } => "init_stream",
            Self::Reasoning { .. } => "reasoning",
            Self::Message { .. } => "message",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
            Self::EndStream { .. } => "end_stream",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::EndStream { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Completed,
    Failed,
    Cancelled,
}
