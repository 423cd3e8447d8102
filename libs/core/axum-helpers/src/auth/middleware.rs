use super::jwt::JwtAuth;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller from `Authorization: Bearer <token>`.
///
/// Never rejects: a missing or invalid token leaves the request anonymous and
/// routes that need a caller reject through [`AuthUser`](super::AuthUser).
///
/// ```ignore
/// let app = routes.layer(axum::middleware::from_fn_with_state(jwt, authenticate));
/// ```
pub async fn authenticate(State(auth): State<JwtAuth>, mut request: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match auth.authenticate(token) {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.id, "Request authenticated");
                request.extensions_mut().insert(identity);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid bearer token"),
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthUser, Identity, JwtConfig, MaybeAuthUser};
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use mongodb::bson::oid::ObjectId;
    use tower::ServiceExt;

    fn app(auth: JwtAuth) -> Router {
        Router::new()
            .route("/me", get(|AuthUser(who): AuthUser| async move { who.email }))
            .route(
                "/maybe",
                get(|MaybeAuthUser(who): MaybeAuthUser| async move {
                    who.map(|w| w.email).unwrap_or_else(|| "anonymous".into())
                }),
            )
            .layer(axum::middleware::from_fn_with_state(auth, authenticate))
    }

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-key-with-at-least-32-characters"))
    }

    async fn get_text(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_valid_token_resolves_identity() {
        let auth = jwt();
        let token = auth
            .issue(&Identity {
                id: ObjectId::new(),
                email: "keks@mail.ru".into(),
            })
            .unwrap();

        let (status, body) = get_text(app(auth), "/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "keks@mail.ru");
    }

    #[tokio::test]
    async fn test_missing_token_rejected_by_auth_user() {
        let (status, body) = get_text(app(jwt()), "/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("COMMON_ERROR"));
    }

    #[tokio::test]
    async fn test_invalid_token_stays_anonymous() {
        let (status, body) = get_text(app(jwt()), "/maybe", Some("garbage")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }
}
