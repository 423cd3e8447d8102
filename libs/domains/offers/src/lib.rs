//! Offers Domain
//!
//! Rental offers, the per-viewer favorite flag, premium listings and the
//! TSV import used by the CLI.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (/offers family)
//! └──────┬──────┘
//!        │            ┌──────────────────┐
//! ┌──────▼──────┐     │ domain_users     │  favorites
//! │   Service   │ ──► │ domain_comments  │  listing, cascade, CommentTarget
//! └──────┬──────┘     └──────────────────┘
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
//! use axum_helpers::AssetUrls;
//! use domain_comments::{CommentService, InMemoryCommentRepository};
//! use domain_offers::{handlers, InMemoryOfferRepository, OfferService};
//! use domain_users::{InMemoryUserRepository, UserService};
//!
//! let state = handlers::OffersState {
//!     offers: OfferService::new(InMemoryOfferRepository::new()),
//!     comments: CommentService::new(InMemoryCommentRepository::new()),
//!     users: UserService::new(InMemoryUserRepository::new(), "pepper-secret"),
//!     assets: AssetUrls::new("http://localhost:8080"),
//! };
//!
//! let router = handlers::router(state);
//! ```

pub mod error;
pub mod handlers;
pub mod import;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{OfferError, OfferResult};
pub use handlers::ApiDoc;
pub use import::{ImportError, ImportedOffer};
pub use models::{
    Amenity, City, Coordinates, CreateOffer, DEFAULT_OFFER_LIMIT, HousingType, MAX_OFFER_LIMIT,
    NewOffer, Offer, OfferPatch, OfferResponse, PREMIUM_OFFER_LIMIT, UpdateOffer,
};
pub use self::mongodb::MongoOfferRepository;
pub use repository::{InMemoryOfferRepository, OfferRepository};
pub use service::OfferService;
