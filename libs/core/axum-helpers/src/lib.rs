//! # Axum Helpers
//!
//! Shared HTTP plumbing for the six-cities services.
//!
//! - **[`errors`]**: the JSON error envelope and [`AppError`]
//! - **[`extractors`]**: [`ObjectIdPath`] and [`ValidatedJson`]
//! - **[`auth`]**: stateless JWT issue/verify, the global [`authenticate`] layer, [`AuthUser`]
//! - **[`assets`]**: `/static` and `/upload` mounts and URL rewriting
//! - **[`upload`]**: multipart file intake
//! - **[`server`]**: router assembly, health, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`validation`]**: custom `validator` functions (ObjectId, RFC 3339 dates)

pub mod assets;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;
pub mod upload;
pub mod validation;

pub use assets::{AssetUrls, file_routes};
pub use auth::{AuthUser, Identity, JwtAuth, JwtClaims, JwtConfig, MaybeAuthUser, authenticate};
pub use errors::{AppError, ErrorResponse, ErrorType, FieldViolation};
pub use extractors::{ObjectIdPath, ValidatedJson};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};
pub use upload::UploadStore;
