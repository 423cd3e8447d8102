//! HTTP handlers for the Comments API

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use axum_helpers::{
    AuthUser, ValidatedJson,
    errors::responses::{
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
        ValidationErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CommentResult;
use crate::models::{CommentResponse, CreateComment};
use crate::repository::CommentRepository;
use crate::service::{CommentService, CommentTarget};

/// Routes served by [`router`], relative to its mount point
pub const ROUTES: &[(&str, &str)] = &[("POST", "/")];

/// OpenAPI documentation for Comments API
#[derive(OpenApi)]
#[openapi(
    paths(create_comment),
    components(
        schemas(CreateComment, CommentResponse),
        responses(
            ValidationErrorResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Comments", description = "Comments on offers")
    )
)]
pub struct ApiDoc;

struct CommentsState<R: CommentRepository> {
    service: CommentService<R>,
    target: Arc<dyn CommentTarget>,
}

/// Create the comments router. `target` resolves the offer a comment is posted to.
pub fn router<R: CommentRepository + 'static>(
    service: CommentService<R>,
    target: Arc<dyn CommentTarget>,
) -> Router {
    Router::new()
        .route("/", post(create_comment))
        .with_state(Arc::new(CommentsState { service, target }))
}

/// Post a comment on an offer
#[utoipa::path(
    post,
    path = "",
    tag = "Comments",
    security(("bearer_auth" = [])),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_comment<R: CommentRepository>(
    State(state): State<Arc<CommentsState<R>>>,
    AuthUser(identity): AuthUser,
    ValidatedJson(input): ValidatedJson<CreateComment>,
) -> CommentResult<impl IntoResponse> {
    let comment = state
        .service
        .create_on(state.target.as_ref(), identity.id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(&comment))))
}
