//! API routes module
//!
//! Wires each domain router to its mount point and applies the global
//! authentication layer.

pub mod comments;
pub mod health;
pub mod offers;
pub mod users;

use axum::{Router, middleware::from_fn_with_state};
use axum_helpers::authenticate;
use tracing::info;

use crate::state::AppState;

/// Log every route a domain router serves under `prefix`
fn log_routes(prefix: &str, routes: &[(&str, &str)]) {
    for (method, path) in routes {
        let full = match *path {
            "/" => prefix.to_string(),
            path => format!("{prefix}{path}"),
        };
        info!("Route registered: {method} {full}");
    }
}

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    log_routes("/users", domain_users::handlers::ROUTES);
    log_routes("/offers", domain_offers::handlers::ROUTES);
    log_routes("/comments", domain_comments::handlers::ROUTES);

    Router::new()
        .nest("/users", users::router(state))
        .nest("/offers", offers::router(state))
        .nest("/comments", comments::router(state))
        .layer(from_fn_with_state(state.jwt.clone(), authenticate))
        .merge(health::router(state.clone()))
}
