use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("queue error: {0}")]
    Queue(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Validation(msg) => AppError::BadRequest(msg),
            DispatchError::Queue(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
