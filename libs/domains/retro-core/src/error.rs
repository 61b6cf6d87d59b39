use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetroError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("upstream error: {0}")]
    Upstream(String),
}

pub type RetroResult<T> = Result<T, RetroError>;
