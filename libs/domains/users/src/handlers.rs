//! HTTP handlers for the Users API

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_helpers::{
    AppError, AssetUrls, AuthUser, Identity, JwtAuth, ObjectIdPath, UploadStore, ValidatedJson,
    errors::responses::{
        BadRequestResponse, ConflictResponse, ForbiddenResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse, ValidationErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, LoggedUser, LoginUser, UploadedAvatar, UserResponse, UserType};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Multipart field carrying the avatar file
pub const AVATAR_FIELD: &str = "avatar";

/// Routes served by [`router`], relative to its mount point
pub const ROUTES: &[(&str, &str)] = &[
    ("POST", "/register"),
    ("POST", "/login"),
    ("GET", "/login"),
    ("POST", "/{user_id}/avatar"),
];

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(register, login, check_session, upload_avatar),
    components(
        schemas(CreateUser, LoginUser, UserResponse, LoggedUser, UploadedAvatar, UserType),
        responses(
            ValidationErrorResponse,
            BadRequestResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "Registration, login and avatars")
    )
)]
pub struct ApiDoc;

/// Everything the user handlers need
pub struct UsersState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt: JwtAuth,
    pub assets: AssetUrls,
    pub uploads: UploadStore,
}

type SharedState<R> = Arc<UsersState<R>>;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(state: UsersState<R>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login).get(check_session))
        .route("/{user_id}/avatar", post(upload_avatar))
        .with_state(Arc::new(state))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, response = ValidationErrorResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(state): State<SharedState<R>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.register(input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::new(&user, &state.assets))))
}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    request_body = LoginUser,
    responses(
        (status = 200, description = "Logged in", body = LoggedUser),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(state): State<SharedState<R>>,
    ValidatedJson(input): ValidatedJson<LoginUser>,
) -> UserResult<Json<LoggedUser>> {
    let user = state.service.verify(&input).await?;

    let token = state
        .jwt
        .issue(&Identity {
            id: user.id,
            email: user.email.clone(),
        })
        .map_err(|e| UserError::Token(e.to_string()))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(LoggedUser::new(&user, token, &state.assets)))
}

/// Return the user behind the presented token
#[utoipa::path(
    get,
    path = "/login",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn check_session<R: UserRepository>(
    State(state): State<SharedState<R>>,
    AuthUser(identity): AuthUser,
) -> UserResult<Json<UserResponse>> {
    // A valid token for a user that no longer exists is still unauthenticated
    let user = state
        .service
        .find_by_id(identity.id)
        .await
        .map_err(|e| match e {
            UserError::NotFound(_) => UserError::Unauthorized,
            other => other,
        })?;

    Ok(Json(UserResponse::new(&user, &state.assets)))
}

/// Upload an avatar for the calling user
#[utoipa::path(
    post,
    path = "/{user_id}/avatar",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ObjectId")),
    request_body(content_type = "multipart/form-data", description = "Field `avatar`: jpg, jpeg or png"),
    responses(
        (status = 201, description = "Avatar stored", body = UploadedAvatar),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn upload_avatar<R: UserRepository>(
    State(state): State<SharedState<R>>,
    AuthUser(identity): AuthUser,
    ObjectIdPath(user_id): ObjectIdPath,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    if identity.id != user_id {
        return Err(UserError::Forbidden("You can only change your own avatar".to_string()).into());
    }

    state.service.find_by_id(user_id).await?;

    let filename = state.uploads.save_field(&mut multipart, AVATAR_FIELD).await?;
    state.service.set_avatar(user_id, filename.clone()).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadedAvatar::new(&filename, &state.assets)),
    ))
}
