//! Database repository layer
//!
//! Handlers and services talk to storage only through [`UserStore`] and [`CatalogStore`].
//! Absence is an `Option`/`bool`, never an error; a duplicate unique key is a typed
//! [`StoreError::Conflict`] decided by the store itself.

pub mod catalog_repo;
pub mod memory;
pub mod user_repo;

pub use catalog_repo::CatalogRepository;
pub use memory::MemoryStore;
pub use user_repo::UserRepository;

use crate::models::{
    catalog::{Actor, Director, Genre, Movie},
    user::{NewUser, User, UserChanges},
};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Unique keys of the user collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueField::Username => "Username",
            UniqueField::Email => "Email",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} already exists", .0.as_str())]
    Conflict(UniqueField),

    /// A write referenced a record that does not exist
    #[error("{0} not found")]
    MissingReference(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Backend(String),
}

/// 将 Postgres 约束错误映射为 [`StoreError`]
pub(crate) fn classify_write_error(err: sqlx::Error, reference: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("users_username_unique") => return StoreError::Conflict(UniqueField::Username),
                Some("users_email_unique") => return StoreError::Conflict(UniqueField::Email),
                _ => {}
            }
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::MissingReference(reference.to_string());
        }
    }
    StoreError::Database(err)
}

/// Persistence of user accounts and their favorites
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Fails with `Conflict` when the username or email is already taken
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// `Ok(None)` when no such user exists
    async fn update_user(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError>;

    /// `Ok(false)` when no such user exists
    async fn delete_user(&self, username: &str) -> Result<bool, StoreError>;

    async fn email_in_use(&self, email: &str) -> Result<bool, StoreError>;

    /// Adds the movie to the end of the favorites unless already present.
    /// Fails with `MissingReference` for an unknown movie.
    async fn add_favorite(&self, username: &str, movie_id: Uuid)
        -> Result<Option<User>, StoreError>;

    async fn remove_favorite(
        &self,
        username: &str,
        movie_id: Uuid,
    ) -> Result<Option<User>, StoreError>;
}

/// Read-only access to the seeded catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError>;

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError>;

    /// Resolves ids in the given order, skipping unknown ones
    async fn find_movies_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Movie>, StoreError>;

    async fn list_genres(&self) -> Result<Vec<Genre>, StoreError>;

    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError>;

    async fn list_directors(&self) -> Result<Vec<Director>, StoreError>;

    async fn find_director_by_name(&self, name: &str) -> Result<Option<Director>, StoreError>;

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError>;

    async fn find_actor_by_name(&self, name: &str) -> Result<Option<Actor>, StoreError>;
}
