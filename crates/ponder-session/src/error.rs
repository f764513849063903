use ponder_persist::PersistError;
use ponder_types::TurnStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(PersistError),

    #[error("Model stream failed: {0}")]
    StreamTransport(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Thread {0} already has a turn in progress")]
    ThreadBusy(String),

    #[error("Turn cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// How a turn that failed with this error is reported in `EndStream`
    pub fn turn_status(&self) -> TurnStatus {
        match self {
            Self::Cancelled => TurnStatus::Cancelled,
            _ => TurnStatus::Failed,
        }
    }
}

impl From<PersistError> for SessionError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::ThreadNotFound(id) => Self::Validation(format!("Thread not found: {}", id)),
            other => Self::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
