use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_comments::CommentError;
use domain_users::UserError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OfferError {
    #[error("Offer with id {0} not found.")]
    NotFound(ObjectId),

    /// Only the author may change or remove an offer
    #[error("Offer {0} belongs to another user")]
    Forbidden(ObjectId),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Users(#[from] UserError),

    #[error(transparent)]
    Comments(#[from] CommentError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OfferResult<T> = Result<T, OfferError>;

/// Convert OfferError to AppError for standardized error responses
impl From<OfferError> for AppError {
    fn from(err: OfferError) -> Self {
        match err {
            OfferError::NotFound(id) => AppError::NotFound(format!("Offer with id {id} not found.")),
            OfferError::Forbidden(id) => {
                AppError::Forbidden(format!("Offer with id {id} is owned by another user."))
            }
            OfferError::BadRequest(msg) => AppError::BadRequest(msg),
            OfferError::Users(e) => e.into(),
            OfferError::Comments(e) => e.into(),
            OfferError::Database(msg) => AppError::InternalServerError(msg),
            OfferError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for OfferError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for OfferError {
    fn from(err: mongodb::error::Error) -> Self {
        OfferError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for OfferError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        OfferError::Internal(format!("BSON serialization failed: {err}"))
    }
}

impl From<strum::ParseError> for OfferError {
    fn from(err: strum::ParseError) -> Self {
        OfferError::Internal(format!("unvalidated enum value: {err}"))
    }
}

impl From<OfferError> for CommentError {
    fn from(err: OfferError) -> Self {
        match err {
            OfferError::NotFound(id) => CommentError::TargetNotFound(id),
            OfferError::Comments(e) => e,
            OfferError::Database(msg) => CommentError::Database(msg),
            other => CommentError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let id = ObjectId::new();
        assert_eq!(AppError::from(OfferError::NotFound(id)).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(OfferError::Forbidden(id)).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::from(OfferError::Users(UserError::NotFound(id))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(OfferError::Database("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        let id = ObjectId::new();
        assert_eq!(
            OfferError::NotFound(id).to_string(),
            format!("Offer with id {id} not found.")
        );
    }
}
