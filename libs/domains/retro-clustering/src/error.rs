use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusteringError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("alert webhook error: {0}")]
    Alert(String),
}

pub type ClusteringResult<T> = Result<T, ClusteringError>;

impl From<sea_orm::DbErr> for ClusteringError {
    fn from(err: sea_orm::DbErr) -> Self {
        ClusteringError::Database(err.to_string())
    }
}

impl From<ClusteringError> for AppError {
    fn from(err: ClusteringError) -> Self {
        match err {
            ClusteringError::Validation(msg) => AppError::BadRequest(msg),
            ClusteringError::NotFound(msg) => AppError::NotFound(msg),
            ClusteringError::Database(msg) => AppError::InternalServerError(msg),
            ClusteringError::Alert(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ClusteringError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
