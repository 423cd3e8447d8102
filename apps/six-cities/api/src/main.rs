use axum_helpers::server::{create_production_app, health_router};
use axum_helpers::file_routes;
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    // Connect to MongoDB with retry
    let mongo_client = database::mongodb::connect_with_retry(&config.mongodb, None).await?;

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    tokio::fs::create_dir_all(&config.files.upload_directory).await?;

    // Build repositories, indexes and services
    let state = AppState::new(config, mongo_client).await?;

    // Build router with API routes
    let api_routes = api::routes(&state);

    // Create a router with OpenAPI docs
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Merge health endpoints and file mounts
    let files = &state.config.files;
    let app = router
        .merge(health_router(state.config.app))
        .merge(file_routes(&files.static_directory, &files.upload_directory));

    info!("Starting Six Cities API with production-ready shutdown (30s timeout)");

    // Production-ready server with graceful shutdown
    let mongo_client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Six Cities API shutdown complete");
    Ok(())
}
