use crate::errors::{AppError, FieldViolation, field_violations};
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use serde_path_to_error::Segment;
use validator::Validate;

/// Upper bound on placeholder substitutions for one body
const MAX_REPAIRS: usize = 64;

/// JSON body extractor that deserializes and then runs `validator` checks.
///
/// All failing fields are reported together, each with the value the client
/// submitted. A body that is not JSON at all is rejected by axum's own
/// `Json` rejection. Fields with the wrong shape (missing, wrong type) are
/// reported next to the `validator` violations of every other field: each
/// one is swapped for a placeholder and deserialization is retried, so one
/// bad field never hides the rest.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateComment {
///     #[validate(length(min = 5, max = 1024))]
///     text: String,
/// }
///
/// async fn create(ValidatedJson(dto): ValidatedJson<CreateComment>) { /* ... */ }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let message = format!("Validation error: \"{}\"", req.uri().path());
        let Json(raw) = Json::<Value>::from_request(req, state).await?;

        let mut body = raw.clone();
        let mut shape: Vec<FieldViolation> = Vec::new();

        for _ in 0..MAX_REPAIRS {
            let failure = match deserialize::<T>(&body) {
                Ok(data) => return finish(data, &raw, shape, message),
                Err(failure) => failure,
            };

            // The body itself is not an object
            if failure.location.is_empty() {
                return Err(AppError::Validation {
                    message: format!("{message}: {}", failure.reason),
                    details: shape,
                });
            }

            if !shape.iter().any(|v| covers(&v.property, &failure.property)) {
                shape.push(FieldViolation {
                    value: lookup(&raw, &failure.location),
                    messages: vec![failure.describe()],
                    property: failure.property.clone(),
                });
            }

            if !repair::<T>(&mut body, &failure) {
                break;
            }
        }

        shape.sort_by(|a, b| a.property.cmp(&b.property));
        Err(AppError::Validation {
            message,
            details: shape,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Key(String),
    Index(usize),
}

/// A field serde could not deserialize
#[derive(Debug)]
struct ShapeFailure {
    location: Vec<Step>,
    property: String,
    reason: String,
    missing: bool,
}

impl ShapeFailure {
    fn describe(&self) -> String {
        if self.missing {
            format!("{} is required", self.property)
        } else {
            format!("{}: {}", self.property, self.reason)
        }
    }
}

fn deserialize<T: DeserializeOwned>(body: &Value) -> Result<T, ShapeFailure> {
    serde_path_to_error::deserialize(body).map_err(|error| {
        let mut location = Vec::new();
        for segment in error.path().iter() {
            match segment {
                Segment::Map { key } => location.push(Step::Key(key.clone())),
                Segment::Seq { index } => location.push(Step::Index(*index)),
                Segment::Enum { .. } | Segment::Unknown => break,
            }
        }

        let reason = error.inner().to_string();
        let missing = match missing_field(&reason) {
            Some(field) => {
                location.push(Step::Key(field.to_string()));
                true
            }
            None => false,
        };

        ShapeFailure {
            property: property_of(&location),
            location,
            reason,
            missing,
        }
    })
}

/// Validate the repaired value; shape violations win over anything
/// `validator` says about the placeholders standing in for them.
fn finish<T: Validate>(
    data: T,
    raw: &Value,
    shape: Vec<FieldViolation>,
    message: String,
) -> Result<ValidatedJson<T>, AppError> {
    let mut details = match data.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => field_violations(&errors, raw),
    };
    details.retain(|v| !shape.iter().any(|s| covers(&s.property, &v.property)));

    if shape.is_empty() && details.is_empty() {
        return Ok(ValidatedJson(data));
    }

    details.extend(shape);
    details.sort_by(|a, b| a.property.cmp(&b.property));
    Err(AppError::Validation { message, details })
}

fn placeholders() -> [Value; 6] {
    [
        Value::Null,
        json!(0),
        json!(""),
        json!(false),
        json!([]),
        json!({}),
    ]
}

/// Swap the failing field for the first placeholder serde accepts there.
/// Returns false when nothing moves the failure elsewhere.
fn repair<T: DeserializeOwned>(body: &mut Value, failure: &ShapeFailure) -> bool {
    for candidate in placeholders() {
        let mut attempt = body.clone();
        if !place(&mut attempt, &failure.location, candidate) {
            return false;
        }
        match deserialize::<T>(&attempt) {
            Err(next) if next.property == failure.property => continue,
            _ => {
                *body = attempt;
                return true;
            }
        }
    }
    false
}

fn place(body: &mut Value, location: &[Step], value: Value) -> bool {
    let Some((last, parents)) = location.split_last() else {
        return false;
    };

    let mut node = body;
    for step in parents {
        node = match (step, node) {
            (Step::Key(key), Value::Object(map)) => match map.get_mut(key) {
                Some(child) => child,
                None => return false,
            },
            (Step::Index(index), Value::Array(items)) => match items.get_mut(*index) {
                Some(child) => child,
                None => return false,
            },
            _ => return false,
        };
    }

    match (last, node) {
        (Step::Key(key), Value::Object(map)) => {
            map.insert(key.clone(), value);
            true
        }
        (Step::Index(index), Value::Array(items)) if *index < items.len() => {
            items[*index] = value;
            true
        }
        _ => false,
    }
}

fn lookup(body: &Value, location: &[Step]) -> Value {
    location
        .iter()
        .try_fold(body, |node, step| match step {
            Step::Key(key) => node.get(key),
            Step::Index(index) => node.get(*index),
        })
        .cloned()
        .unwrap_or(Value::Null)
}

/// Dotted path with bracketed indices: `coordinates.latitude`, `images[2]`
fn property_of(location: &[Step]) -> String {
    let mut property = String::new();
    for step in location {
        match step {
            Step::Key(key) => {
                if !property.is_empty() {
                    property.push('.');
                }
                property.push_str(key);
            }
            Step::Index(index) => property.push_str(&format!("[{index}]")),
        }
    }
    property
}

/// `child` is `parent` itself or lies beneath it
fn covers(parent: &str, child: &str) -> bool {
    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('['))
}

/// serde reports absent fields as "missing field `name`"
fn missing_field(reason: &str) -> Option<&str> {
    reason
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::post,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use serde_json::json;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct NewComment {
        #[validate(length(min = 5, max = 1024, message = "text must be 5 to 1024 characters"))]
        text: String,
        #[validate(range(min = 1, max = 5, message = "rating must be 1 to 5"))]
        rating: u8,
    }

    #[derive(Deserialize, Validate)]
    struct Spot {
        #[validate(range(min = -90.0, max = 90.0))]
        latitude: f64,
        longitude: f64,
    }

    #[derive(Deserialize, Validate)]
    struct NewListing {
        #[validate(length(min = 10, max = 100, message = "must be 10 to 100 characters"))]
        name: String,
        #[validate(range(min = 1, max = 8))]
        room_count: i32,
        #[validate(length(equal = 2))]
        images: Vec<String>,
        #[validate(nested)]
        spot: Spot,
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/comments",
                post(|ValidatedJson(c): ValidatedJson<NewComment>| async move {
                    format!("{}:{}", c.rating, c.text)
                }),
            )
            .route(
                "/listings",
                post(|ValidatedJson(l): ValidatedJson<NewListing>| async move { l.name }),
            )
    }

    async fn send(body: Body) -> (StatusCode, Value) {
        send_to("/comments", body).await
    }

    async fn send_to(uri: &str, body: Body) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let (status, _) = send(Body::from(json!({"text": "Lovely view", "rating": 5}).to_string())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reports_all_violations() {
        let (status, body) = send(Body::from(json!({"text": "Meh", "rating": 9}).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "Validation error: \"/comments\"");

        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["property"], "rating");
        assert_eq!(details[0]["value"], 9);
        assert_eq!(details[1]["property"], "text");
        assert_eq!(details[1]["messages"][0], "text must be 5 to 1024 characters");
    }

    #[tokio::test]
    async fn test_missing_field_becomes_violation() {
        let (status, body) = send(Body::from(json!({"rating": 3}).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["property"], "text");
        assert_eq!(body["details"][0]["value"], Value::Null);
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let (status, body) = send(Body::from("{\"text\": ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "VALIDATION_ERROR");
    }

    fn properties(body: &Value) -> Vec<&str> {
        body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["property"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_wrong_type_reported_with_other_violations() {
        let body = json!({
            "name": "short",
            "room_count": "two",
            "images": ["a.jpg", "b.jpg"],
            "spot": { "latitude": 48.85, "longitude": 2.35 }
        });
        let (status, body) = send_to("/listings", Body::from(body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation error: \"/listings\"");
        assert_eq!(properties(&body), ["name", "room_count"]);
        assert_eq!(body["details"][0]["messages"][0], "name must be 10 to 100 characters");
        assert_eq!(body["details"][1]["value"], "two");
        assert!(
            body["details"][1]["messages"][0]
                .as_str()
                .unwrap()
                .starts_with("room_count: invalid type")
        );
    }

    #[tokio::test]
    async fn test_nested_missing_field_uses_dotted_path() {
        let body = json!({
            "name": "Sunny loft near the canal",
            "room_count": 2,
            "images": ["a.jpg", "b.jpg"],
            "spot": { "longitude": 2.0 }
        });
        let (status, body) = send_to("/listings", Body::from(body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(properties(&body), ["spot.latitude"]);
        assert_eq!(body["details"][0]["value"], Value::Null);
        assert_eq!(body["details"][0]["messages"][0], "spot.latitude is required");
    }

    #[tokio::test]
    async fn test_several_shape_errors_reported_together() {
        let body = json!({
            "room_count": 2,
            "images": ["a.jpg", 7],
            "spot": "Paris"
        });
        let (status, body) = send_to("/listings", Body::from(body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(properties(&body), ["images[1]", "name", "spot"]);
        assert_eq!(body["details"][0]["value"], 7);
        assert_eq!(body["details"][2]["value"], "Paris");
    }

    #[tokio::test]
    async fn test_non_object_body_rejected() {
        let (status, body) = send(Body::from("\"just text\"")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "VALIDATION_ERROR");
        assert_eq!(body["details"], json!([]));
    }

    #[test]
    fn test_property_paths() {
        let location = [
            Step::Key("images".into()),
            Step::Index(2),
            Step::Key("url".into()),
        ];
        assert_eq!(property_of(&location), "images[2].url");
        assert!(covers("spot", "spot.latitude"));
        assert!(covers("images", "images[1]"));
        assert!(covers("name", "name"));
        assert!(!covers("name", "names"));
    }

    #[test]
    fn test_missing_field_parsing() {
        assert_eq!(missing_field("missing field `offer_id`"), Some("offer_id"));
        assert_eq!(missing_field("invalid type: string, expected u8"), None);
    }
}
