//! Offers API routes

use axum::Router;
use domain_offers::handlers::{self, OffersState};

use crate::state::AppState;

/// Create offers router
pub fn router(state: &AppState) -> Router {
    handlers::router(OffersState {
        offers: state.offers.clone(),
        comments: state.comments.clone(),
        users: state.users.clone(),
        assets: state.assets.clone(),
    })
}
