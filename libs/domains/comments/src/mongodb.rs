//! MongoDB implementation of CommentRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{doc, oid::ObjectId},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;

use crate::error::CommentResult;
use crate::models::Comment;
use crate::repository::CommentRepository;

/// MongoDB implementation of the CommentRepository
pub struct MongoCommentRepository {
    collection: Collection<Comment>,
}

impl MongoCommentRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Comment>("comments");
        Self { collection }
    }

    /// Initialize indexes for listing by offer
    pub async fn init_indexes(&self) -> CommentResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "offer_id": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_offer_created".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Comment indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MongoCommentRepository {
    #[instrument(skip(self, comment), fields(offer_id = %comment.offer_id))]
    async fn create(&self, comment: Comment) -> CommentResult<Comment> {
        self.collection.insert_one(&comment).await?;

        tracing::info!(comment_id = %comment.id, "Comment created successfully");
        Ok(comment)
    }

    #[instrument(skip(self))]
    async fn find_by_offer_id(&self, offer_id: ObjectId, limit: i64) -> CommentResult<Vec<Comment>> {
        let options = FindOptions::builder()
            .limit(limit)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "offer_id": offer_id })
            .with_options(options)
            .await?;
        let comments: Vec<Comment> = cursor.try_collect().await?;

        Ok(comments)
    }

    #[instrument(skip(self))]
    async fn delete_by_offer_id(&self, offer_id: ObjectId) -> CommentResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "offer_id": offer_id })
            .await?;

        tracing::info!(deleted = result.deleted_count, "Comments deleted for offer");
        Ok(result.deleted_count)
    }
}
