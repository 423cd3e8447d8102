use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, RawPathParams},
    http::request::Parts,
};
use mongodb::bson::oid::ObjectId;

/// Extractor for the single ObjectId path parameter of a route.
///
/// ```ignore
/// async fn show(ObjectIdPath(id): ObjectIdPath) -> String {
///     id.to_hex()
/// }
///
/// let app = Router::new().route("/offers/{offer_id}", get(show));
/// ```
///
/// `GET /offers/nope` is rejected with 400 `offer_id is invalid ObjectID`.
#[derive(Debug, Clone, Copy)]
pub struct ObjectIdPath(pub ObjectId);

impl<S> FromRequestParts<S> for ObjectIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = RawPathParams::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InternalServerError(format!("path parameters unavailable: {e}")))?;

        let (name, raw) = params
            .iter()
            .next()
            .ok_or_else(|| AppError::InternalServerError("route has no path parameter".into()))?;

        ObjectId::parse_str(raw)
            .map(ObjectIdPath)
            .map_err(|_| AppError::BadRequest(format!("{name} is invalid ObjectID")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/offers/{offer_id}",
            get(|ObjectIdPath(id): ObjectIdPath| async move { id.to_hex() }),
        )
    }

    #[tokio::test]
    async fn test_valid_object_id() {
        let id = ObjectId::new();
        let response = app()
            .oneshot(Request::get(format!("/offers/{id}")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_object_id_names_parameter() {
        let response = app()
            .oneshot(Request::get("/offers/not-an-id").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "offer_id is invalid ObjectID");
    }
}
