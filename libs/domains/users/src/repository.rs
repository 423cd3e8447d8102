use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, normalize_email};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with `DuplicateEmail` if the email is taken
    async fn create(&self, user: User) -> UserResult<User>;

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    /// Case-insensitive lookup
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Replace the avatar filename and return the updated user
    async fn set_avatar(&self, id: ObjectId, avatar: String) -> UserResult<User>;

    /// Idempotent; returns the resulting favorite set
    async fn add_favorite(&self, id: ObjectId, offer_id: ObjectId) -> UserResult<Vec<ObjectId>>;

    /// Idempotent; returns the resulting favorite set
    async fn remove_favorite(&self, id: ObjectId, offer_id: ObjectId)
    -> UserResult<Vec<ObjectId>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<ObjectId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        let email = normalize_email(&user.email);
        if users.values().any(|u| u.email == email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn set_avatar(&self, id: ObjectId, avatar: String) -> UserResult<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;

        user.avatar = Some(avatar);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn add_favorite(&self, id: ObjectId, offer_id: ObjectId) -> UserResult<Vec<ObjectId>> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;

        if !user.favorites.contains(&offer_id) {
            user.favorites.push(offer_id);
            user.updated_at = Utc::now();
        }
        Ok(user.favorites.clone())
    }

    async fn remove_favorite(
        &self,
        id: ObjectId,
        offer_id: ObjectId,
    ) -> UserResult<Vec<ObjectId>> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;

        user.favorites.retain(|f| f != &offer_id);
        user.updated_at = Utc::now();
        Ok(user.favorites.clone())
    }
}
