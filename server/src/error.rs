use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid donation amount")]
    InvalidAmount,

    #[error("Raised update kept conflicting, giving up")]
    Contention,

    #[error("Raised total overflow")]
    Overflow,

    #[error("Persistence error: {0}")]
    Persistence(#[from] redis::RedisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidAmount => StatusCode::BAD_REQUEST,
            AppError::Contention { .. } | AppError::Overflow { .. } | AppError::Persistence { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
