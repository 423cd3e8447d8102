use axum_helpers::AssetUrls;
use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Shown for users who never uploaded an avatar
pub const DEFAULT_AVATAR: &str = "default-avatar.jpg";

/// Account kind
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserType {
    #[default]
    Ordinary,
    Pro,
}

/// User entity as stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Stored lowercased; see [`normalize_email`]
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub user_type: UserType,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub favorites: Vec<ObjectId>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(input: NewUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            email: normalize_email(&input.email),
            name: input.name,
            password_hash,
            user_type: input.user_type,
            avatar: input.avatar,
            favorites: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_favorite(&self, offer_id: &ObjectId) -> bool {
        self.favorites.contains(offer_id)
    }
}

/// Emails compare case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Already-validated user data, as produced by registration or the importer
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub user_type: UserType,
    pub avatar: Option<String>,
}

/// DTO for `POST /users/register`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, max = 15, message = "name must be 1 to 15 characters"))]
    pub name: String,
    #[validate(length(min = 6, max = 12, message = "password must be 6 to 12 characters"))]
    pub password: String,
    #[validate(custom(function = "validate_user_type"))]
    #[schema(example = "ordinary")]
    pub user_type: String,
    #[validate(length(min = 1, message = "avatar must not be empty"))]
    pub avatar: Option<String>,
}

impl CreateUser {
    /// Split into the user data and the plaintext password.
    ///
    /// Call only after `validate()` passed.
    pub fn into_new_user(self) -> (NewUser, String) {
        let user = NewUser {
            email: self.email,
            name: self.name,
            user_type: UserType::from_str(&self.user_type).unwrap_or_default(),
            avatar: self.avatar,
        };
        (user, self.password)
    }
}

fn validate_user_type(value: &str) -> Result<(), ValidationError> {
    UserType::from_str(value).map(|_| ()).map_err(|_| {
        ValidationError::new("user_type")
            .with_message("user_type must be one of: ordinary, pro".into())
    })
}

/// DTO for `POST /users/login`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginUser {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, max = 12, message = "password must be 6 to 12 characters"))]
    pub password: String,
}

/// User as exposed over HTTP; never carries the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "6523f1c4a1b2c3d4e5f60718")]
    pub id: String,
    pub email: String,
    pub name: String,
    /// Absolute URL
    pub avatar: String,
    pub user_type: UserType,
}

impl UserResponse {
    pub fn new(user: &User, assets: &AssetUrls) -> Self {
        Self {
            id: user.id.to_hex(),
            email: user.email.clone(),
            name: user.name.clone(),
            avatar: avatar_url(user, assets),
            user_type: user.user_type,
        }
    }
}

/// Successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoggedUser {
    pub token: String,
    pub email: String,
    pub name: String,
    pub avatar: String,
    pub user_type: UserType,
}

impl LoggedUser {
    pub fn new(user: &User, token: String, assets: &AssetUrls) -> Self {
        Self {
            token,
            email: user.email.clone(),
            name: user.name.clone(),
            avatar: avatar_url(user, assets),
            user_type: user.user_type,
        }
    }
}

/// Response of an avatar upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadedAvatar {
    /// Absolute URL of the stored file
    pub filepath: String,
}

impl UploadedAvatar {
    pub fn new(filename: &str, assets: &AssetUrls) -> Self {
        Self {
            filepath: assets.resolve(filename),
        }
    }
}

fn avatar_url(user: &User, assets: &AssetUrls) -> String {
    assets.resolve(user.avatar.as_deref().unwrap_or(DEFAULT_AVATAR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_user() -> CreateUser {
        CreateUser {
            email: "Keks@Example.com".to_string(),
            name: "Keks".to_string(),
            password: "secret1".to_string(),
            user_type: "pro".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_user_type_parsing() {
        assert_eq!(UserType::from_str("pro").unwrap(), UserType::Pro);
        assert_eq!(UserType::from_str("ordinary").unwrap(), UserType::Ordinary);
        assert!(UserType::from_str("admin").is_err());
        assert_eq!(UserType::Pro.to_string(), "pro");
    }

    #[test]
    fn test_create_user_validation() {
        assert!(create_user().validate().is_ok());

        let mut input = create_user();
        input.user_type = "admin".to_string();
        input.password = "123".to_string();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_type"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_name_length_bounds() {
        let mut input = create_user();
        input.name = "x".repeat(16);
        assert!(input.validate().is_err());
        input.name = "x".repeat(15);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_new_user_normalizes_email() {
        let (new_user, password) = create_user().into_new_user();
        assert_eq!(new_user.user_type, UserType::Pro);
        assert_eq!(password, "secret1");

        let user = User::new(new_user, "hash".to_string());
        assert_eq!(user.email, "keks@example.com");
        assert!(user.favorites.is_empty());
    }

    #[test]
    fn test_response_uses_default_avatar() {
        let (new_user, _) = create_user().into_new_user();
        let user = User::new(new_user, "hash".to_string());
        let assets = AssetUrls::new("http://localhost:8080");

        let response = UserResponse::new(&user, &assets);
        assert_eq!(response.id, user.id.to_hex());
        assert_eq!(response.avatar, "http://localhost:8080/static/default-avatar.jpg");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["user_type"], "pro");
    }

    #[test]
    fn test_uploaded_avatar_points_to_upload_dir() {
        let assets = AssetUrls::new("http://localhost:8080");
        let avatar = UploadedAvatar::new("f00.png", &assets);
        assert_eq!(avatar.filepath, "http://localhost:8080/upload/f00.png");
    }
}
