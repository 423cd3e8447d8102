use crate::{env_or_default, env_parse_or, ConfigError, FromEnv};
use std::net::Ipv4Addr;

/// HTTP listener settings plus the externally visible base URL.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base used to build absolute links to served files, without a trailing slash.
    pub public_url: String,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            public_url: default_public_url(port),
            port,
        }
    }

    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_public_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

impl FromEnv for ServerConfig {
    /// - HOST: defaults to 0.0.0.0
    /// - PORT: defaults to 8080
    /// - PUBLIC_URL: defaults to http://localhost:{PORT}
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string());
        let port = env_parse_or("PORT", 8080u16)?;
        let config = Self::new(host, port);

        Ok(match std::env::var("PUBLIC_URL") {
            Ok(url) if !url.trim().is_empty() => config.with_public_url(url.trim()),
            _ => config,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED.to_string(), 8080)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_env_with_defaults() {
        temp_env::with_vars(
            [
                ("HOST", None::<&str>),
                ("PORT", None::<&str>),
                ("PUBLIC_URL", None::<&str>),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.address(), "0.0.0.0:8080");
                assert_eq!(config.public_url, "http://localhost:8080");
            },
        );
    }

    #[test]
    fn test_server_config_public_url_follows_port() {
        temp_env::with_vars(
            [
                ("HOST", Some("127.0.0.1")),
                ("PORT", Some("4000")),
                ("PUBLIC_URL", None::<&str>),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.address(), "127.0.0.1:4000");
                assert_eq!(config.public_url, "http://localhost:4000");
            },
        );
    }

    #[test]
    fn test_server_config_public_url_trailing_slash_trimmed() {
        temp_env::with_vars(
            [("PORT", None::<&str>), ("PUBLIC_URL", Some("https://six-cities.example/"))],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.public_url, "https://six-cities.example");
            },
        );
    }

    #[test]
    fn test_server_config_from_env_invalid_port() {
        for bad in ["not_a_number", "99999"] {
            temp_env::with_var("PORT", Some(bad), || {
                let err = ServerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("PORT"));
            });
        }
    }
}
