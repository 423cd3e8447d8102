use core_config::{ConfigError, FromEnv, env_parse_or, env_required};
use std::time::Duration;

/// Default token lifetime: two days
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(2 * 24 * 60 * 60);

const MIN_SECRET_LEN: usize = 32;

/// JWT signing configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - at least 32 characters
/// - `JWT_TTL_HOURS` (optional, default: 48)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl: Duration,
}

impl JwtConfig {
    /// # Panics
    /// Panics if the secret is shorter than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= MIN_SECRET_LEN,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        let hours: u64 = env_parse_or("JWT_TTL_HOURS", 48)?;
        if hours == 0 {
            return Err(ConfigError::ParseError {
                key: "JWT_TTL_HOURS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            secret,
            ttl: Duration::from_secs(hours * 60 * 60),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_jwt_config_new_defaults_to_two_days() {
        let config = JwtConfig::new(SECRET);
        assert_eq!(config.ttl, Duration::from_secs(172_800));
    }

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn test_jwt_config_new_too_short() {
        JwtConfig::new("short");
    }

    #[test]
    fn test_jwt_config_from_env() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_TTL_HOURS", Some("6"))],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, SECRET);
                assert_eq!(config.ttl, Duration::from_secs(6 * 3600));
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_rejects_short_secret_and_zero_ttl() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_TTL_HOURS", Some("0"))],
            || {
                let err = JwtConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_TTL_HOURS"));
            },
        );
    }
}
