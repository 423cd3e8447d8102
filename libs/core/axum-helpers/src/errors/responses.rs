//! Reusable OpenAPI responses, referenced from `#[utoipa::path]` as
//! `(status = 404, response = NotFoundResponse)`.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Request validation failed",
    content_type = "application/json",
    example = json!({
        "errorType": "VALIDATION_ERROR",
        "message": "Validation error: \"/offers\"",
        "details": [{
            "property": "name",
            "value": "Flat",
            "messages": ["name must be 10 to 100 characters"]
        }]
    })
)]
pub struct ValidationErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Malformed identifier",
    content_type = "application/json",
    example = json!({
        "errorType": "COMMON_ERROR",
        "message": "offer_id is invalid ObjectID",
        "details": []
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Missing or invalid bearer token",
    content_type = "application/json",
    example = json!({
        "errorType": "COMMON_ERROR",
        "message": "Unauthorized",
        "details": []
    })
)]
pub struct UnauthorizedResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Caller may not modify this resource",
    content_type = "application/json",
    example = json!({
        "errorType": "COMMON_ERROR",
        "message": "Only the author can modify this offer",
        "details": []
    })
)]
pub struct ForbiddenResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "errorType": "COMMON_ERROR",
        "message": "Offer with id 6530f4c2a1b2c3d4e5f60718 not found.",
        "details": []
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource already exists",
    content_type = "application/json",
    example = json!({
        "errorType": "COMMON_ERROR",
        "message": "User with email «keks@mail.ru» exists.",
        "details": []
    })
)]
pub struct ConflictResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "errorType": "SERVICE_ERROR",
        "message": "An internal server error occurred",
        "details": []
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);
