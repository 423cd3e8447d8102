use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CommentResult;
use crate::models::Comment;

/// Repository trait for Comment persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: Comment) -> CommentResult<Comment>;

    /// Comments of one offer, newest first, at most `limit`
    async fn find_by_offer_id(&self, offer_id: ObjectId, limit: i64) -> CommentResult<Vec<Comment>>;

    /// Remove every comment of one offer; returns how many were removed
    async fn delete_by_offer_id(&self, offer_id: ObjectId) -> CommentResult<u64>;
}

/// In-memory implementation of CommentRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCommentRepository {
    comments: Arc<RwLock<HashMap<ObjectId, Comment>>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn create(&self, comment: Comment) -> CommentResult<Comment> {
        let mut comments = self.comments.write().await;
        comments.insert(comment.id, comment.clone());

        tracing::info!(comment_id = %comment.id, offer_id = %comment.offer_id, "Created comment");
        Ok(comment)
    }

    async fn find_by_offer_id(&self, offer_id: ObjectId, limit: i64) -> CommentResult<Vec<Comment>> {
        let comments = self.comments.read().await;
        let mut found: Vec<Comment> = comments
            .values()
            .filter(|c| c.offer_id == offer_id)
            .cloned()
            .collect();

        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        found.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(found)
    }

    async fn delete_by_offer_id(&self, offer_id: ObjectId) -> CommentResult<u64> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|_, c| c.offer_id != offer_id);
        Ok((before - comments.len()) as u64)
    }
}
