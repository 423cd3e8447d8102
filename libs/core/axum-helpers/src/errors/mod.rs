//! Error envelope shared by every route.
//!
//! Errors fall into three categories, checked in this order:
//!
//! 1. validation failures: 400, `VALIDATION_ERROR`, per-field `details`
//! 2. domain HTTP errors: carried status, `COMMON_ERROR`
//! 3. everything else: 500, `SERVICE_ERROR`, generic message
//!
//! ```json
//! {
//!   "errorType": "VALIDATION_ERROR",
//!   "message": "Validation error: \"/offers\"",
//!   "details": [
//!     { "property": "name", "value": "Short", "messages": ["name must be 10 to 100 characters"] }
//!   ]
//! }
//! ```

pub mod codes;
pub mod handlers;
pub mod responses;
mod violations;

pub use codes::ErrorType;
pub use violations::{FieldViolation, field_violations};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Message returned for any 5xx; the cause is only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: ErrorType,
    pub message: String,
    #[serde(default)]
    pub details: Vec<FieldViolation>,
}

impl ErrorResponse {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            details: Vec::new(),
        }
    }
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldViolation>,
    },

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Not Implemented: {0}")]
    NotImplemented(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Validation error without per-field details
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::JsonExtractorRejection(e) => e.status(),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Io(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            AppError::Validation { .. } | AppError::JsonExtractorRejection(_) => {
                ErrorType::ValidationError
            }
            AppError::Io(_)
            | AppError::InternalServerError(_)
            | AppError::ServiceUnavailable(_) => ErrorType::ServiceError,
            _ => ErrorType::CommonError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = self.error_type();

        let body = match self {
            AppError::Validation { message, details } => {
                for violation in &details {
                    tracing::info!(
                        property = %violation.property,
                        messages = ?violation.messages,
                        "Validation failed"
                    );
                }
                ErrorResponse {
                    error_type,
                    message,
                    details,
                }
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error = %e, "Rejected JSON body");
                ErrorResponse::new(error_type, e.body_text())
            }
            AppError::Io(e) => {
                tracing::error!(error = ?e, "I/O error");
                ErrorResponse::new(error_type, INTERNAL_ERROR_MESSAGE)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                ErrorResponse::new(error_type, INTERNAL_ERROR_MESSAGE)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                ErrorResponse::new(error_type, msg)
            }
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::NotImplemented(msg) => {
                tracing::info!(status = status.as_u16(), "{}", msg);
                ErrorResponse::new(error_type, msg)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Build an error response outside of the `AppError` flow.
pub fn error_response(status: StatusCode, error_type: ErrorType, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(error_type, message))).into_response()
}
