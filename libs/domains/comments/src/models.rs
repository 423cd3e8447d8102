use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Comment entity as stored in the `comments` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub text: String,
    pub rating: i32,
    pub author_id: ObjectId,
    pub offer_id: ObjectId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author_id: ObjectId, offer_id: ObjectId, text: String, rating: i32) -> Self {
        Self {
            id: ObjectId::new(),
            text,
            rating,
            author_id,
            offer_id,
            created_at: Utc::now(),
        }
    }
}

/// DTO for `POST /comments`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(length(min = 5, max = 1024, message = "text must be 5 to 1024 characters"))]
    pub text: String,
    #[validate(range(min = 1, max = 5, message = "rating must be 1 to 5"))]
    pub rating: i32,
    #[validate(custom(function = "axum_helpers::validation::object_id"))]
    #[schema(example = "6523f1c4a1b2c3d4e5f60718")]
    pub offer_id: String,
}

/// Comment as exposed over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: String,
    pub text: String,
    pub rating: i32,
    pub author_id: String,
    pub offer_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_hex(),
            text: comment.text.clone(),
            rating: comment.rating,
            author_id: comment.author_id.to_hex(),
            offer_id: comment.offer_id.to_hex(),
            created_at: comment.created_at,
        }
    }
}
