//! MongoDB connection management shared by the API and the import CLI.
//!
//! # Features
//!
//! - `mongodb` (default) - client construction, retry on connect, health checks
//! - `config` (default) - `core_config::FromEnv` for [`mongodb::MongoConfig`]
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::mongodb::{MongoConfig, connect_with_retry};
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
