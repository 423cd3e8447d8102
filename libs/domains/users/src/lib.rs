//! Users Domain
//!
//! Registration, login and the per-user state the rest of the service hangs
//! off: avatar and favorite offers.
//!
//! # Features
//!
//! - Registration with case-insensitive unique email
//! - Password hashing with Argon2id, peppered with the configured salt
//! - Login issuing a bearer JWT
//! - Avatar upload
//! - Favorite offer set (`$addToSet` / `$pull`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, password hashing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and MongoDB implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{AssetUrls, JwtAuth, JwtConfig, UploadStore};
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new(), "pepper-secret");
//! let state = handlers::UsersState {
//!     service,
//!     jwt: JwtAuth::new(&JwtConfig::new("a-secret-that-is-at-least-32-chars-long")),
//!     assets: AssetUrls::new("http://localhost:8080"),
//!     uploads: UploadStore::new("upload"),
//! };
//!
//! let router = handlers::router(state);
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use config::PasswordConfig;
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateUser, LoggedUser, LoginUser, NewUser, UploadedAvatar, User, UserResponse, UserType,
};
pub use self::mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
