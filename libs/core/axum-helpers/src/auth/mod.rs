//! Stateless JWT authentication.
//!
//! [`authenticate`] runs on every request and attaches an [`Identity`] when a
//! valid bearer token is present. Handlers then ask for [`AuthUser`] (401 when
//! anonymous) or [`MaybeAuthUser`].

pub mod config;
pub mod identity;
pub mod jwt;
pub mod middleware;

pub use config::{DEFAULT_TOKEN_TTL, JwtConfig};
pub use identity::{AuthUser, Identity, MaybeAuthUser};
pub use jwt::{JwtAuth, JwtClaims, TokenError};
pub use middleware::authenticate;
