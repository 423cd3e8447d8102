use async_trait::async_trait;
use domain_comments::{CommentError, CommentResult, CommentTarget};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{OfferError, OfferResult};
use crate::models::{City, NewOffer, Offer, OfferPatch, PREMIUM_OFFER_LIMIT};
use crate::repository::OfferRepository;

/// Service layer for Offer business logic
pub struct OfferService<R: OfferRepository> {
    repository: Arc<R>,
}

impl<R: OfferRepository> Clone for OfferService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: OfferRepository> OfferService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, author_id: ObjectId, input: NewOffer) -> OfferResult<Offer> {
        self.repository.create(Offer::new(author_id, input)).await
    }

    pub async fn find(&self, limit: i64) -> OfferResult<Vec<Offer>> {
        self.repository.find(limit).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: ObjectId) -> OfferResult<Offer> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(OfferError::NotFound(id))
    }

    pub async fn find_by_ids(&self, ids: Vec<ObjectId>) -> OfferResult<Vec<Offer>> {
        self.repository.find_by_ids(ids).await
    }

    pub async fn exists(&self, id: ObjectId) -> OfferResult<bool> {
        self.repository.exists(id).await
    }

    /// Load an offer and check `user_id` authored it
    pub async fn find_owned(&self, id: ObjectId, user_id: ObjectId) -> OfferResult<Offer> {
        let offer = self.find_by_id(id).await?;
        if offer.author_id != user_id {
            return Err(OfferError::Forbidden(id));
        }
        Ok(offer)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_by_id(&self, id: ObjectId, patch: OfferPatch) -> OfferResult<Offer> {
        self.repository.update(id, patch).await
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: ObjectId) -> OfferResult<()> {
        if !self.repository.delete(id).await? {
            return Err(OfferError::NotFound(id));
        }
        Ok(())
    }

    /// Newest premium offers of `city`, at most [`PREMIUM_OFFER_LIMIT`]
    pub async fn find_premium_by_city(&self, city: City) -> OfferResult<Vec<Offer>> {
        self.repository
            .find_premium_by_city(city, PREMIUM_OFFER_LIMIT)
            .await
    }

    #[instrument(skip(self))]
    pub async fn increment_comment_count(&self, id: ObjectId) -> OfferResult<()> {
        self.repository.increment_comment_count(id).await
    }
}

#[async_trait]
impl<R: OfferRepository> CommentTarget for OfferService<R> {
    async fn target_exists(&self, id: ObjectId) -> CommentResult<bool> {
        self.exists(id).await.map_err(CommentError::from)
    }

    async fn comment_added(&self, id: ObjectId) -> CommentResult<()> {
        self.increment_comment_count(id)
            .await
            .map_err(CommentError::from)
    }
}
