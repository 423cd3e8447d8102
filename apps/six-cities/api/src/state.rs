//! Application state management.
//!
//! Services are built once at startup and shared by every router:
//! - Configuration
//! - MongoDB client
//! - JWT signer/verifier and asset URL rewriting
//! - Users, offers and comments services over MongoDB repositories

use axum_helpers::{AssetUrls, JwtAuth};
use domain_comments::{CommentService, MongoCommentRepository};
use domain_offers::{MongoOfferRepository, OfferService};
use domain_users::{MongoUserRepository, UserService};
use mongodb::Client;
use tracing::info;

use crate::config::Config;

/// Shared application state.
///
/// Cloning is cheap: services hold their repositories behind `Arc` and the
/// MongoDB client shares its connection pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    pub jwt: JwtAuth,
    pub assets: AssetUrls,
    pub users: UserService<MongoUserRepository>,
    pub offers: OfferService<MongoOfferRepository>,
    pub comments: CommentService<MongoCommentRepository>,
}

impl AppState {
    /// Build repositories, create their indexes and wire the services
    pub async fn new(config: Config, mongo_client: Client) -> eyre::Result<Self> {
        let db = mongo_client.database(config.mongodb.database());

        let users = MongoUserRepository::new(&db);
        users.init_indexes().await?;
        let offers = MongoOfferRepository::new(&db);
        offers.init_indexes().await?;
        let comments = MongoCommentRepository::new(&db);
        comments.init_indexes().await?;
        info!("MongoDB indexes initialized");

        Ok(Self {
            jwt: JwtAuth::new(&config.jwt),
            assets: AssetUrls::new(&config.server.public_url),
            users: UserService::new(users, config.password.salt.as_str()),
            offers: OfferService::new(offers),
            comments: CommentService::new(comments),
            config,
            mongo_client,
        })
    }
}
