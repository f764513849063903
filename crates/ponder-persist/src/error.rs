use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Unsupported schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error("Store is closed")]
    Closed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    /// The request referenced data that does not exist; the store itself is healthy
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ThreadNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
