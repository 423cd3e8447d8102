//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{DateTime, doc, oid::ObjectId},
    error::{Error, ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{User, normalize_email};
use crate::repository::UserRepository;

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<User>("users");
        Self { collection }
    }

    /// Initialize indexes. Emails are stored normalized, so a plain unique
    /// index enforces case-insensitive uniqueness.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    async fn update_returning(
        &self,
        id: ObjectId,
        update: mongodb::bson::Document,
    ) -> UserResult<User> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, update)
            .with_options(options)
            .await?
            .ok_or(UserError::NotFound(id))
    }
}

fn is_duplicate_key(err: &Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref e)) if e.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: User) -> UserResult<User> {
        match self.collection.insert_one(&user).await {
            Ok(_) => {
                tracing::info!(user_id = %user.id, "User created successfully");
                Ok(user)
            }
            Err(e) if is_duplicate_key(&e) => Err(UserError::DuplicateEmail(user.email)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let filter = doc! { "email": normalize_email(email) };
        Ok(self.collection.find_one(filter).await?)
    }

    #[instrument(skip(self))]
    async fn set_avatar(&self, id: ObjectId, avatar: String) -> UserResult<User> {
        let update = doc! {
            "$set": { "avatar": avatar, "updated_at": DateTime::now() }
        };
        let user = self.update_returning(id, update).await?;

        tracing::info!(user_id = %id, "Avatar updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn add_favorite(&self, id: ObjectId, offer_id: ObjectId) -> UserResult<Vec<ObjectId>> {
        let update = doc! {
            "$addToSet": { "favorites": offer_id },
            "$set": { "updated_at": DateTime::now() }
        };
        Ok(self.update_returning(id, update).await?.favorites)
    }

    #[instrument(skip(self))]
    async fn remove_favorite(
        &self,
        id: ObjectId,
        offer_id: ObjectId,
    ) -> UserResult<Vec<ObjectId>> {
        let update = doc! {
            "$pull": { "favorites": offer_id },
            "$set": { "updated_at": DateTime::now() }
        };
        Ok(self.update_returning(id, update).await?.favorites)
    }
}
