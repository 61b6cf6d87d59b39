use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("object store error: {0}")]
    ObjectStore(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("upstream provider error: {0}")]
    Provider(String),

    #[error("upstream provider timed out: {0}")]
    Timeout(String),

    /// An event blob or visual-model response that doesn't parse into the
    /// expected shape. Never transient: retrying won't fix a contract break.
    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

pub type ReplayResult<T> = Result<T, ReplayError>;

impl From<sea_orm::DbErr> for ReplayError {
    fn from(err: sea_orm::DbErr) -> Self {
        ReplayError::Database(err.to_string())
    }
}

impl From<ReplayError> for AppError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::Validation(msg) => AppError::BadRequest(msg),
            ReplayError::SchemaViolation(msg) => AppError::BadRequest(msg),
            ReplayError::Database(msg) => AppError::InternalServerError(msg),
            ReplayError::ObjectStore(msg) => AppError::InternalServerError(msg),
            ReplayError::Render(msg) => AppError::InternalServerError(msg),
            ReplayError::Provider(msg) => AppError::InternalServerError(msg),
            ReplayError::Timeout(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ReplayError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Maps to the worker runtime's retry/dead-letter decision: transport,
/// render, and timeout failures are retried; a malformed event blob or
/// visual-model response is not (retrying won't fix a contract break).
impl From<ReplayError> for stream_worker::BrokerError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::Timeout(msg) => stream_worker::BrokerError::Timeout(msg),
            ReplayError::Validation(msg) => stream_worker::BrokerError::Processing(format!("validation: {msg}")),
            ReplayError::Database(msg) => stream_worker::BrokerError::Processing(format!("database: {msg}")),
            ReplayError::ObjectStore(msg) => stream_worker::BrokerError::Processing(format!("object store: {msg}")),
            ReplayError::Render(msg) => stream_worker::BrokerError::Processing(format!("render: {msg}")),
            ReplayError::Provider(msg) => stream_worker::BrokerError::Processing(format!("provider: {msg}")),
            ReplayError::SchemaViolation(msg) => {
                stream_worker::BrokerError::Processing(format!("schema violation: {msg}"))
            }
        }
    }
}
