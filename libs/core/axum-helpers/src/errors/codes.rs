use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Machine-readable category of an error response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// Request body or parameters failed validation
    ValidationError,
    /// A domain rule rejected the request with an explicit status
    CommonError,
    /// Unclassified failure
    ServiceError,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ValidationError => "VALIDATION_ERROR",
            ErrorType::CommonError => "COMMON_ERROR",
            ErrorType::ServiceError => "SERVICE_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_as_str() {
        for t in [ErrorType::ValidationError, ErrorType::CommonError, ErrorType::ServiceError] {
            assert_eq!(serde_json::to_value(t).unwrap(), t.as_str());
        }
    }
}
