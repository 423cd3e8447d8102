//! Comments API routes
//!
//! Comments are posted against offers, so the offer service is handed to the
//! comments domain as its `CommentTarget`.

use axum::Router;
use domain_comments::handlers;
use std::sync::Arc;

use crate::state::AppState;

/// Create comments router
pub fn router(state: &AppState) -> Router {
    handlers::router(state.comments.clone(), Arc::new(state.offers.clone()))
}
