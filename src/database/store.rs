//! Store Traits
//!
//! The persistence boundary consumed by the auth core and the route handlers.
//! Both backends ([`InMemoryStore`](super::InMemoryStore) and
//! [`DatabaseConnection`](super::DatabaseConnection)) implement these.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Movie, NewUser, User, UserUpdate};

/// Storage-layer failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or query failed
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Unique constraint violated; carries the conflicting value when known
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored document did not match the expected record shape
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) {
            let constraint = err
                .as_db_error()
                .and_then(|db| db.constraint())
                .unwrap_or("unique")
                .to_string();
            return StoreError::Conflict(constraint);
        }
        StoreError::Unavailable(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// User collection accessor
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Insert a new user. Fails with `Conflict` when the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Replace the editable fields of `username`'s record.
    /// Returns `None` when no such user exists.
    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<Option<User>, StoreError>;

    /// Append `movie_id` to the favorites list (duplicates kept).
    async fn add_favorite(&self, username: &str, movie_id: Uuid) -> Result<Option<User>, StoreError>;

    /// Remove every occurrence of `movie_id` from the favorites list.
    async fn remove_favorite(&self, username: &str, movie_id: Uuid) -> Result<Option<User>, StoreError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_user(&self, username: &str) -> Result<bool, StoreError>;
}

/// Movie collection accessor (read-only)
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError>;

    /// First movie whose genre has this name
    async fn find_by_genre(&self, genre: &str) -> Result<Option<Movie>, StoreError>;

    /// First movie whose director has this name
    async fn find_by_director(&self, director: &str) -> Result<Option<Movie>, StoreError>;
}
