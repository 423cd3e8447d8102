use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{OfferError, OfferResult};
use crate::models::{City, Offer, OfferPatch};

/// Repository trait for Offer persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn create(&self, offer: Offer) -> OfferResult<Offer>;

    /// Newest first, at most `limit`
    async fn find(&self, limit: i64) -> OfferResult<Vec<Offer>>;

    async fn find_by_id(&self, id: ObjectId) -> OfferResult<Option<Offer>>;

    /// Offers whose id is in `ids`, newest first. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: Vec<ObjectId>) -> OfferResult<Vec<Offer>>;

    async fn exists(&self, id: ObjectId) -> OfferResult<bool>;

    /// Apply a partial update; returns the updated offer or `NotFound`
    async fn update(&self, id: ObjectId, patch: OfferPatch) -> OfferResult<Offer>;

    /// Returns true when an offer was removed
    async fn delete(&self, id: ObjectId) -> OfferResult<bool>;

    /// Premium offers of one city, newest first, at most `limit`
    async fn find_premium_by_city(&self, city: City, limit: i64) -> OfferResult<Vec<Offer>>;

    async fn increment_comment_count(&self, id: ObjectId) -> OfferResult<()>;
}

/// In-memory implementation of OfferRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryOfferRepository {
    offers: Arc<RwLock<HashMap<ObjectId, Offer>>>,
}

impl InMemoryOfferRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut offers: Vec<Offer>, limit: i64) -> Vec<Offer> {
    offers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    offers.truncate(usize::try_from(limit).unwrap_or(0));
    offers
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn create(&self, offer: Offer) -> OfferResult<Offer> {
        let mut offers = self.offers.write().await;
        offers.insert(offer.id, offer.clone());

        tracing::info!(offer_id = %offer.id, "Created offer");
        Ok(offer)
    }

    async fn find(&self, limit: i64) -> OfferResult<Vec<Offer>> {
        let offers = self.offers.read().await;
        Ok(newest_first(offers.values().cloned().collect(), limit))
    }

    async fn find_by_id(&self, id: ObjectId) -> OfferResult<Option<Offer>> {
        let offers = self.offers.read().await;
        Ok(offers.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: Vec<ObjectId>) -> OfferResult<Vec<Offer>> {
        let offers = self.offers.read().await;
        let found = ids.iter().filter_map(|id| offers.get(id).cloned()).collect();
        Ok(newest_first(found, i64::MAX))
    }

    async fn exists(&self, id: ObjectId) -> OfferResult<bool> {
        let offers = self.offers.read().await;
        Ok(offers.contains_key(&id))
    }

    async fn update(&self, id: ObjectId, patch: OfferPatch) -> OfferResult<Offer> {
        let mut offers = self.offers.write().await;
        let offer = offers.get_mut(&id).ok_or(OfferError::NotFound(id))?;
        offer.apply_patch(patch);

        tracing::info!(offer_id = %id, "Updated offer");
        Ok(offer.clone())
    }

    async fn delete(&self, id: ObjectId) -> OfferResult<bool> {
        let mut offers = self.offers.write().await;
        Ok(offers.remove(&id).is_some())
    }

    async fn find_premium_by_city(&self, city: City, limit: i64) -> OfferResult<Vec<Offer>> {
        let offers = self.offers.read().await;
        let found = offers
            .values()
            .filter(|o| o.is_premium && o.city == city)
            .cloned()
            .collect();
        Ok(newest_first(found, limit))
    }

    async fn increment_comment_count(&self, id: ObjectId) -> OfferResult<()> {
        let mut offers = self.offers.write().await;
        let offer = offers.get_mut(&id).ok_or(OfferError::NotFound(id))?;
        offer.comment_count += 1;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Amenity, City, Coordinates, HousingType, NewOffer};
    use chrono::Utc;

    pub fn new_offer(name: &str, city: City, is_premium: bool) -> NewOffer {
        NewOffer {
            name: name.to_string(),
            description: "A comfortable place in the city centre".to_string(),
            posted_at: Utc::now(),
            city,
            preview_image: "apartment-01.jpg".to_string(),
            images: vec!["apartment-01.jpg".to_string()],
            is_premium,
            rating: 4.0,
            housing_type: HousingType::Apartment,
            room_count: 2,
            guest_count: 3,
            price: 120,
            amenities: vec![Amenity::Washer],
            coordinates: Coordinates {
                latitude: 48.85661,
                longitude: 2.351499,
            },
        }
    }
}
