#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or, env_required};

/// MongoDB connection settings
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    pub url: String,
    pub database: String,
    /// Reported to the server in connection metadata
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Build a config from discrete credentials, authenticating against `admin`.
    ///
    /// Username and password are percent-encoded so that characters such as
    /// `@` or `:` survive inside the connection string.
    pub fn from_credentials(
        user: &str,
        password: &str,
        host: &str,
        port: u16,
        database: impl Into<String>,
    ) -> Self {
        let database = database.into();
        let url = format!(
            "mongodb://{}:{}@{}:{}/{}?authSource=admin",
            urlencoding::encode(user),
            urlencoding::encode(password),
            host,
            port,
            database
        );
        Self::new(url, database)
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Connection string with the password replaced, safe for logs
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let credentials = &self.url[scheme_end + 3..at];
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{}{}:***{}", &self.url[..scheme_end + 3], user, &self.url[at..])
            }
            _ => self.url.clone(),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: "six-cities".to_string(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }
}

/// Environment variables:
/// - `MONGODB_URL` (optional) - full connection string, takes precedence over `DB_*`
/// - `DB_USER`, `DB_PASSWORD` (required without `MONGODB_URL`)
/// - `DB_HOST` (default: 127.0.0.1), `DB_PORT` (default: 27017)
/// - `DB_NAME` (required) - database name
/// - `MONGODB_APP_NAME` (optional)
/// - `MONGODB_MAX_POOL_SIZE` (default: 100), `MONGODB_MIN_POOL_SIZE` (default: 5)
/// - `MONGODB_CONNECT_TIMEOUT_SECS` (default: 10)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (default: 30)
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let database = env_required("DB_NAME")?;

        let base = match std::env::var("MONGODB_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim(), database),
            _ => Self::from_credentials(
                &env_required("DB_USER")?,
                &env_required("DB_PASSWORD")?,
                &env_or_default("DB_HOST", "127.0.0.1"),
                env_parse_or("DB_PORT", 27017u16)?,
                database,
            ),
        };

        Ok(Self {
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size: env_parse_or("MONGODB_MAX_POOL_SIZE", base.max_pool_size)?,
            min_pool_size: env_parse_or("MONGODB_MIN_POOL_SIZE", base.min_pool_size)?,
            connect_timeout_secs: env_parse_or(
                "MONGODB_CONNECT_TIMEOUT_SECS",
                base.connect_timeout_secs,
            )?,
            server_selection_timeout_secs: env_parse_or(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                base.server_selection_timeout_secs,
            )?,
            ..base
        })
    }
}
