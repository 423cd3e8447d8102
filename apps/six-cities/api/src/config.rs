use axum_helpers::JwtConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_or_default, env_parse_or, server::ServerConfig,
};
use domain_users::PasswordConfig;
use std::path::PathBuf;

// Import MongoDB config from the database library
use database::mongodb::MongoConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

const DEFAULT_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Served and uploaded files.
///
/// - `UPLOAD_DIRECTORY` (default: `upload`)
/// - `STATIC_DIRECTORY_PATH` (default: `static`)
/// - `UPLOAD_MAX_BYTES` (default: 5 MiB)
#[derive(Clone, Debug)]
pub struct FileConfig {
    pub upload_directory: PathBuf,
    pub static_directory: PathBuf,
    pub upload_max_bytes: usize,
}

impl FromEnv for FileConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            upload_directory: env_or_default("UPLOAD_DIRECTORY", "upload").into(),
            static_directory: env_or_default("STATIC_DIRECTORY_PATH", "static").into(),
            upload_max_bytes: env_parse_or("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES)?,
        })
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub files: FileConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;
        let password = PasswordConfig::from_env()?;
        let files = FileConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            jwt,
            password,
            files,
            environment,
        })
    }
}
