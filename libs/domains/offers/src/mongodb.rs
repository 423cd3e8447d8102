//! MongoDB implementation of OfferRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, DateTime, Document, doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
};
use serde::Serialize;
use tracing::instrument;

use crate::error::{OfferError, OfferResult};
use crate::models::{City, Offer, OfferPatch};
use crate::repository::OfferRepository;

/// MongoDB implementation of the OfferRepository
pub struct MongoOfferRepository {
    collection: Collection<Offer>,
}

impl MongoOfferRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Offer>("offers");
        Self { collection }
    }

    /// Initialize indexes for listing and premium lookups
    pub async fn init_indexes(&self) -> OfferResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "city": 1, "is_premium": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_city_premium".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Offer indexes created successfully");
        Ok(())
    }

    async fn find_newest(&self, filter: Document, limit: Option<i64>) -> OfferResult<Vec<Offer>> {
        let mut find = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit);
        }

        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }
}

fn set_field<T: Serialize>(set: &mut Document, key: &str, value: Option<T>) -> OfferResult<()> {
    if let Some(value) = value {
        set.insert(key, bson::to_bson(&value)?);
    }
    Ok(())
}

/// `$set` document for a patch. Author and comment counter have no patch fields.
fn patch_document(patch: OfferPatch) -> OfferResult<Document> {
    let mut set = Document::new();
    set_field(&mut set, "name", patch.name)?;
    set_field(&mut set, "description", patch.description)?;
    if let Some(posted_at) = patch.posted_at {
        set.insert("posted_at", DateTime::from_chrono(posted_at));
    }
    set_field(&mut set, "city", patch.city)?;
    set_field(&mut set, "preview_image", patch.preview_image)?;
    set_field(&mut set, "images", patch.images)?;
    set_field(&mut set, "is_premium", patch.is_premium)?;
    set_field(&mut set, "rating", patch.rating)?;
    set_field(&mut set, "housing_type", patch.housing_type)?;
    set_field(&mut set, "room_count", patch.room_count)?;
    set_field(&mut set, "guest_count", patch.guest_count)?;
    set_field(&mut set, "price", patch.price)?;
    set_field(&mut set, "amenities", patch.amenities)?;
    set_field(&mut set, "coordinates", patch.coordinates)?;
    set.insert("updated_at", DateTime::now());
    Ok(set)
}

#[async_trait]
impl OfferRepository for MongoOfferRepository {
    #[instrument(skip(self, offer), fields(offer_id = %offer.id))]
    async fn create(&self, offer: Offer) -> OfferResult<Offer> {
        self.collection.insert_one(&offer).await?;
        tracing::info!(offer_id = %offer.id, "Offer created successfully");
        Ok(offer)
    }

    #[instrument(skip(self))]
    async fn find(&self, limit: i64) -> OfferResult<Vec<Offer>> {
        self.find_newest(doc! {}, Some(limit)).await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> OfferResult<Option<Offer>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: Vec<ObjectId>) -> OfferResult<Vec<Offer>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_newest(doc! { "_id": { "$in": ids } }, None).await
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: ObjectId) -> OfferResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "_id": id })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: ObjectId, patch: OfferPatch) -> OfferResult<Offer> {
        let update = doc! { "$set": patch_document(patch)? };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let offer = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(options)
            .await?
            .ok_or(OfferError::NotFound(id))?;

        tracing::info!(offer_id = %id, "Offer updated successfully");
        Ok(offer)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> OfferResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count > 0 {
            tracing::info!(offer_id = %id, "Offer deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn find_premium_by_city(&self, city: City, limit: i64) -> OfferResult<Vec<Offer>> {
        let filter = doc! { "city": city.to_string(), "is_premium": true };
        self.find_newest(filter, Some(limit)).await
    }

    #[instrument(skip(self))]
    async fn increment_comment_count(&self, id: ObjectId) -> OfferResult<()> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$inc": { "comment_count": 1 } })
            .await?;

        if result.matched_count == 0 {
            return Err(OfferError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::new_offer;
    use test_utils::TestMongo;

    #[test]
    fn test_patch_document_only_sets_present_fields() {
        let set = patch_document(OfferPatch {
            price: Some(300),
            city: Some(City::Brussels),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(set.get_i32("price").unwrap(), 300);
        assert_eq!(set.get_str("city").unwrap(), "Brussels");
        assert!(set.contains_key("updated_at"));
        assert!(!set.contains_key("name"));
        assert!(!set.contains_key("comment_count"));
        assert!(!set.contains_key("author_id"));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_counter_and_premium_listing() {
        let mongo = TestMongo::new().await;
        let repo = MongoOfferRepository::new(&mongo.database());
        repo.init_indexes().await.unwrap();

        let premium = repo
            .create(Offer::new(ObjectId::new(), new_offer("Premium loft", City::Paris, true)))
            .await
            .unwrap();
        repo.create(Offer::new(ObjectId::new(), new_offer("Plain room", City::Paris, false)))
            .await
            .unwrap();

        repo.increment_comment_count(premium.id).await.unwrap();
        let reloaded = repo.find_by_id(premium.id).await.unwrap().unwrap();
        assert_eq!(reloaded.comment_count, 1);

        let found = repo.find_premium_by_city(City::Paris, 3).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, premium.id);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_update_and_delete() {
        let mongo = TestMongo::new().await;
        let repo = MongoOfferRepository::new(&mongo.database());
        let offer = repo
            .create(Offer::new(ObjectId::new(), new_offer("Old name here", City::Hamburg, false)))
            .await
            .unwrap();

        let updated = repo
            .update(
                offer.id,
                OfferPatch {
                    name: Some("New name here".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "New name here");
        assert_eq!(updated.author_id, offer.author_id);

        assert!(repo.delete(offer.id).await.unwrap());
        assert!(!repo.exists(offer.id).await.unwrap());
    }
}
