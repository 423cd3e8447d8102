//! Custom `validator` functions shared by request DTOs.
//!
//! ```ignore
//! #[derive(Deserialize, Validate)]
//! struct CreateComment {
//!     #[validate(custom(function = "axum_helpers::validation::object_id"))]
//!     offer_id: String,
//! }
//! ```

use chrono::DateTime;
use mongodb::bson::oid::ObjectId;
use validator::ValidationError;

/// 24-character hex ObjectId
pub fn object_id(value: &str) -> Result<(), ValidationError> {
    ObjectId::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("object_id").with_message("must be a valid ObjectID".into()))
}

/// RFC 3339 timestamp, e.g. `2024-03-01T12:00:00Z`
pub fn rfc3339_date(value: &str) -> Result<(), ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("rfc3339").with_message("must be an ISO 8601 (RFC 3339) date".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id() {
        assert!(object_id("6523f1c4a1b2c3d4e5f60718").is_ok());
        assert!(object_id("6523f1c4").is_err());
        assert!(object_id("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_rfc3339_date() {
        assert!(rfc3339_date("2024-03-01T12:00:00Z").is_ok());
        assert!(rfc3339_date("2024-03-01T12:00:00.123+02:00").is_ok());
        assert!(rfc3339_date("01.03.2024").is_err());
        assert!(rfc3339_date("2024-03-01").is_err());
    }
}
