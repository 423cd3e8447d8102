use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommentError {
    /// The offer a comment was posted to does not exist
    #[error("Offer with id {0} not found.")]
    TargetNotFound(ObjectId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CommentResult<T> = Result<T, CommentError>;

/// Convert CommentError to AppError for standardized error responses
impl From<CommentError> for AppError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::TargetNotFound(id) => {
                AppError::NotFound(format!("Offer with id {id} not found."))
            }
            CommentError::Database(msg) => AppError::InternalServerError(msg),
            CommentError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CommentError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CommentError {
    fn from(err: mongodb::error::Error) -> Self {
        CommentError::Database(err.to_string())
    }
}
