use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("upstream provider error: {0}")]
    Provider(String),

    #[error("upstream provider timed out: {0}")]
    Timeout(String),

    /// A remote provider response that doesn't parse into the expected
    /// shape. Never transient: retrying won't fix a contract break.
    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl From<sea_orm::DbErr> for AnalysisError {
    fn from(err: sea_orm::DbErr) -> Self {
        AnalysisError::Database(err.to_string())
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation(msg) => AppError::BadRequest(msg),
            AnalysisError::SchemaViolation(msg) => AppError::BadRequest(msg),
            AnalysisError::Database(msg) => AppError::InternalServerError(msg),
            AnalysisError::Provider(msg) => AppError::InternalServerError(msg),
            AnalysisError::Timeout(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Maps to the worker runtime's retry/dead-letter decision: transport and
/// timeout failures are retried, schema violations from a malformed upstream
/// response are not (retrying won't fix a contract break).
impl From<AnalysisError> for stream_worker::BrokerError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Timeout(msg) => stream_worker::BrokerError::Timeout(msg),
            AnalysisError::Validation(msg) => stream_worker::BrokerError::Processing(format!("validation: {msg}")),
            AnalysisError::Database(msg) => stream_worker::BrokerError::Processing(format!("database: {msg}")),
            AnalysisError::Provider(msg) => stream_worker::BrokerError::Processing(format!("provider: {msg}")),
            AnalysisError::SchemaViolation(msg) => stream_worker::BrokerError::Processing(format!("schema violation: {msg}")),
        }
    }
}
