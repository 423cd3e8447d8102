//! Comments Domain
//!
//! Reviews left on offers. A comment always belongs to exactly one offer;
//! the offer side is reached through [`CommentTarget`] so this crate does not
//! depend on the offers domain.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (POST /comments)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, CommentTarget seam
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and MongoDB implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{CommentError, CommentResult};
pub use handlers::ApiDoc;
pub use models::{Comment, CommentResponse, CreateComment};
pub use self::mongodb::MongoCommentRepository;
pub use repository::{CommentRepository, InMemoryCommentRepository};
pub use service::{COMMENTS_LIMIT, CommentService, CommentTarget};
