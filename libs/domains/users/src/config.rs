use core_config::{ConfigError, FromEnv, env_required};

const MIN_SALT_LEN: usize = 8;

/// Password hashing secret, mixed into every argon2 hash.
///
/// - `SALT` (required) - at least 8 characters
#[derive(Clone, Debug)]
pub struct PasswordConfig {
    pub salt: String,
}

impl FromEnv for PasswordConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let salt = env_required("SALT")?;
        if salt.len() < MIN_SALT_LEN {
            return Err(ConfigError::ParseError {
                key: "SALT".to_string(),
                details: format!("must be at least {MIN_SALT_LEN} characters"),
            });
        }
        Ok(Self { salt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_is_required_and_checked() {
        temp_env::with_var_unset("SALT", || {
            let err = PasswordConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SALT"));
        });
        temp_env::with_var("SALT", Some("short"), || {
            let err = PasswordConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("SALT"));
        });
        temp_env::with_var("SALT", Some("long-enough-salt"), || {
            assert_eq!(PasswordConfig::from_env().unwrap().salt, "long-enough-salt");
        });
    }
}
