use core_config::FromEnv;
use database::mongodb::MongoConfig;
use domain_users::PasswordConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Configuration for the maintenance commands: the database plus the
/// password secret needed to create imported authors.
#[derive(Clone, Debug)]
pub struct Config {
    pub mongodb: MongoConfig,
    pub password: PasswordConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            mongodb: MongoConfig::from_env()?,
            password: PasswordConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }
}
