use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, LoginUser, NewUser, User};
use crate::repository::UserRepository;

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    /// Argon2 secret mixed into every hash
    pepper: Arc<str>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            pepper: Arc::clone(&self.pepper),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, pepper: impl Into<Arc<str>>) -> Self {
        Self {
            repository: Arc::new(repository),
            pepper: pepper.into(),
        }
    }

    /// Register a new account. Email uniqueness is checked up front; the
    /// repository still reports a race as `DuplicateEmail`.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: CreateUser) -> UserResult<User> {
        let (new_user, password) = input.into_new_user();

        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(UserError::DuplicateEmail(new_user.email));
        }

        self.create(new_user, &password).await
    }

    /// Return the user with `new_user.email`, creating it with `password` if absent
    #[instrument(skip(self, new_user, password), fields(email = %new_user.email))]
    pub async fn find_or_create(&self, new_user: NewUser, password: &str) -> UserResult<User> {
        if let Some(existing) = self.find_by_email(&new_user.email).await? {
            return Ok(existing);
        }

        self.create(new_user, password).await
    }

    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.repository.find_by_email(email).await
    }

    pub async fn find_by_id(&self, id: ObjectId) -> UserResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    pub async fn exists(&self, id: ObjectId) -> UserResult<bool> {
        Ok(self.repository.find_by_id(id).await?.is_some())
    }

    /// Check login credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn verify(&self, input: &LoginUser) -> UserResult<User> {
        let user = self
            .repository
            .find_by_email(&input.email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.verify_password(&input.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Rejected login with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn set_avatar(&self, id: ObjectId, filename: String) -> UserResult<User> {
        self.repository.set_avatar(id, filename).await
    }

    #[instrument(skip(self))]
    pub async fn add_favorite(&self, id: ObjectId, offer_id: ObjectId) -> UserResult<Vec<ObjectId>> {
        self.repository.add_favorite(id, offer_id).await
    }

    #[instrument(skip(self))]
    pub async fn remove_favorite(
        &self,
        id: ObjectId,
        offer_id: ObjectId,
    ) -> UserResult<Vec<ObjectId>> {
        self.repository.remove_favorite(id, offer_id).await
    }

    /// Favorite offer ids of the user, in insertion order
    pub async fn favorite_ids(&self, id: ObjectId) -> UserResult<Vec<ObjectId>> {
        Ok(self.find_by_id(id).await?.favorites)
    }

    async fn create(&self, new_user: NewUser, password: &str) -> UserResult<User> {
        let password_hash = self.hash_password(password)?;
        self.repository.create(User::new(new_user, password_hash)).await
    }

    // Password helpers

    fn hasher(&self) -> UserResult<Argon2<'_>> {
        Argon2::new_with_secret(
            self.pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| UserError::PasswordHash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;
        Ok(self
            .hasher()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserType;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};

    const PEPPER: &str = "test-pepper";

    fn create_user(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            name: "Keks".to_string(),
            password: "secret1".to_string(),
            user_type: "ordinary".to_string(),
            avatar: None,
        }
    }

    fn login(email: &str, password: &str) -> LoginUser {
        LoginUser {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let service = UserService::new(InMemoryUserRepository::new(), PEPPER);
        let user = service.register(create_user("a@example.com")).await.unwrap();

        assert_ne!(user.password_hash, "secret1");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicate_keeps_first_user() {
        let service = UserService::new(InMemoryUserRepository::new(), PEPPER);
        let first = service.register(create_user("dup@example.com")).await.unwrap();

        let second = service.register(create_user("DUP@example.com")).await;
        assert!(matches!(second, Err(UserError::DuplicateEmail(_))));

        let found = service.find_by_email("dup@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let service = UserService::new(InMemoryUserRepository::new(), PEPPER);
        let user = service.register(create_user("login@example.com")).await.unwrap();

        let verified = service.verify(&login("login@example.com", "secret1")).await.unwrap();
        assert_eq!(verified.id, user.id);

        let wrong = service.verify(&login("login@example.com", "secret2")).await;
        assert!(matches!(wrong, Err(UserError::InvalidCredentials)));

        let unknown = service.verify(&login("nobody@example.com", "secret1")).await;
        assert!(matches!(unknown, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_pepper_is_part_of_the_hash() {
        let repository = InMemoryUserRepository::new();
        let service = UserService::new(repository.clone(), PEPPER);
        service.register(create_user("pepper@example.com")).await.unwrap();

        let other = UserService::new(repository, "another-pepper");
        let result = other.verify(&login("pepper@example.com", "secret1")).await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let service = UserService::new(InMemoryUserRepository::new(), PEPPER);
        let new_user = NewUser {
            email: "host@example.com".to_string(),
            name: "Host".to_string(),
            user_type: UserType::Pro,
            avatar: Some("avatar.jpg".to_string()),
        };

        let first = service.find_or_create(new_user.clone(), "secret1").await.unwrap();
        let second = service.find_or_create(new_user, "other-pw").await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_add_then_remove_favorite() {
        let service = UserService::new(InMemoryUserRepository::new(), PEPPER);
        let user = service.register(create_user("fav@example.com")).await.unwrap();
        let offer = ObjectId::new();

        service.remove_favorite(user.id, offer).await.unwrap();
        service.add_favorite(user.id, offer).await.unwrap();
        service.add_favorite(user.id, offer).await.unwrap();
        service.remove_favorite(user.id, offer).await.unwrap();

        assert!(service.favorite_ids(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(None));

        let service = UserService::new(mock, PEPPER);
        let result = service.find_by_id(ObjectId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_database_errors_propagate() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_email()
            .returning(|_| Err(UserError::Database("connection reset".to_string())));

        let service = UserService::new(mock, PEPPER);
        let result = service.register(create_user("x@example.com")).await;
        assert!(matches!(result, Err(UserError::Database(_))));
    }
}
