use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{CommentError, CommentResult};
use crate::models::{Comment, CreateComment};
use crate::repository::CommentRepository;

/// Maximum number of comments returned for one offer
pub const COMMENTS_LIMIT: i64 = 50;

/// The thing comments are attached to.
///
/// Implemented by the offers domain: `target_exists` backs the 404 check on
/// comment creation and `comment_added` bumps the offer's comment counter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentTarget: Send + Sync {
    async fn target_exists(&self, id: ObjectId) -> CommentResult<bool>;

    async fn comment_added(&self, id: ObjectId) -> CommentResult<()>;
}

/// Service layer for Comment business logic
pub struct CommentService<R: CommentRepository> {
    repository: Arc<R>,
}

impl<R: CommentRepository> Clone for CommentService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: CommentRepository> CommentService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Store a comment by `author_id`. The offer is not checked here; see
    /// [`create_on`](Self::create_on).
    #[instrument(skip(self, input))]
    pub async fn create(&self, author_id: ObjectId, input: CreateComment) -> CommentResult<Comment> {
        let offer_id = parse_offer_id(&input.offer_id)?;
        let comment = Comment::new(author_id, offer_id, input.text, input.rating);
        self.repository.create(comment).await
    }

    /// Check the target exists, store the comment, then notify the target.
    ///
    /// Nothing is written when the target is missing.
    #[instrument(skip(self, target, input), fields(offer_id = %input.offer_id))]
    pub async fn create_on<T>(
        &self,
        target: &T,
        author_id: ObjectId,
        input: CreateComment,
    ) -> CommentResult<Comment>
    where
        T: CommentTarget + ?Sized,
    {
        let offer_id = parse_offer_id(&input.offer_id)?;
        if !target.target_exists(offer_id).await? {
            return Err(CommentError::TargetNotFound(offer_id));
        }

        let comment = self.create(author_id, input).await?;
        target.comment_added(offer_id).await?;
        Ok(comment)
    }

    /// Newest first, at most [`COMMENTS_LIMIT`]
    pub async fn find_by_offer_id(&self, offer_id: ObjectId) -> CommentResult<Vec<Comment>> {
        self.repository
            .find_by_offer_id(offer_id, COMMENTS_LIMIT)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_by_offer_id(&self, offer_id: ObjectId) -> CommentResult<u64> {
        self.repository.delete_by_offer_id(offer_id).await
    }
}

fn parse_offer_id(raw: &str) -> CommentResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|e| CommentError::Internal(format!("unvalidated offer_id: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryCommentRepository, MockCommentRepository};

    fn input(offer_id: ObjectId) -> CreateComment {
        CreateComment {
            text: "Quiet street, nice host".to_string(),
            rating: 4,
            offer_id: offer_id.to_hex(),
        }
    }

    #[tokio::test]
    async fn test_create_on_missing_target_writes_nothing() {
        let mut target = MockCommentTarget::new();
        target.expect_target_exists().returning(|_| Ok(false));
        target.expect_comment_added().never();

        let mut repository = MockCommentRepository::new();
        repository.expect_create().never();

        let service = CommentService::new(repository);
        let offer = ObjectId::new();
        let result = service.create_on(&target, ObjectId::new(), input(offer)).await;

        assert!(matches!(result, Err(CommentError::TargetNotFound(id)) if id == offer));
    }

    #[tokio::test]
    async fn test_create_on_notifies_target_once() {
        let offer = ObjectId::new();
        let mut target = MockCommentTarget::new();
        target
            .expect_target_exists()
            .withf(move |id| *id == offer)
            .returning(|_| Ok(true));
        target
            .expect_comment_added()
            .withf(move |id| *id == offer)
            .times(1)
            .returning(|_| Ok(()));

        let service = CommentService::new(InMemoryCommentRepository::new());
        let author = ObjectId::new();
        let comment = service.create_on(&target, author, input(offer)).await.unwrap();

        assert_eq!(comment.author_id, author);
        assert_eq!(comment.offer_id, offer);
        assert_eq!(service.find_by_offer_id(offer).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_uses_the_listing_limit() {
        let mut repository = MockCommentRepository::new();
        repository
            .expect_find_by_offer_id()
            .withf(|_, limit| *limit == COMMENTS_LIMIT)
            .returning(|_, _| Ok(Vec::new()));

        let service = CommentService::new(repository);
        assert!(service.find_by_offer_id(ObjectId::new()).await.unwrap().is_empty());
    }
}
