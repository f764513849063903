use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ponder_persist::PersistError;
use ponder_session::SessionError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("No turn in progress for thread {0}")]
    NoActiveTurn(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Thread {0} already has a turn in progress")]
    ThreadBusy(String),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Session error: {0}")]
    Session(SessionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Storage(e) => ApiError::Persist(e),
            SessionError::Validation(msg) => ApiError::BadRequest(msg),
            SessionError::ThreadBusy(thread_id) => ApiError::ThreadBusy(thread_id),
            other => ApiError::Session(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ThreadNotFound(_) | ApiError::NoActiveTurn(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::ThreadBusy(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Persist(PersistError::ThreadNotFound(ref id)) => {
                (StatusCode::NOT_FOUND, format!("Thread not found: {}", id))
            }
            ApiError::Persist(PersistError::Closed) => {
                tracing::warn!("Request after store shutdown");
                (StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable".to_string())
            }
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Session(ref e) => {
                tracing::error!("Session error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Processing error".to_string())
            }
            ApiError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::ThreadNotFound("t".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("empty".into()), StatusCode::BAD_REQUEST),
            (ApiError::ThreadBusy("t".into()), StatusCode::CONFLICT),
            (ApiError::Persist(PersistError::Closed), StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::Session(SessionError::Cancelled), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_session_errors_unwrap_to_specific_variants() {
        let busy: ApiError = SessionError::ThreadBusy("t1".into()).into();
        assert!(matches!(busy, ApiError::ThreadBusy(ref id) if id == "t1"));

        let storage: ApiError = SessionError::Storage(PersistError::Closed).into();
        assert!(matches!(storage, ApiError::Persist(PersistError::Closed)));
    }
}
