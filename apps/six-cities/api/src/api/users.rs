//! Users API routes

use axum::{Router, extract::DefaultBodyLimit};
use axum_helpers::UploadStore;
use domain_users::handlers::{self, UsersState};

use crate::state::AppState;

/// Create users router; the body limit covers avatar uploads
pub fn router(state: &AppState) -> Router {
    let files = &state.config.files;

    handlers::router(UsersState {
        service: state.users.clone(),
        jwt: state.jwt.clone(),
        assets: state.assets.clone(),
        uploads: UploadStore::new(files.upload_directory.clone()),
    })
    .layer(DefaultBodyLimit::max(files.upload_max_bytes))
}
