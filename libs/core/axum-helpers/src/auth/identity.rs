use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use mongodb::bson::oid::ObjectId;
use std::convert::Infallible;

/// The authenticated caller, placed in request extensions by
/// [`authenticate`](super::middleware::authenticate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: ObjectId,
    pub email: String,
}

/// Requires an authenticated caller; rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
    }
}

/// The caller if a valid token was presented, `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<Identity>().cloned()))
    }
}
