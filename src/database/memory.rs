//! In-memory store backend, used when no `DATABASE_URL` is configured and
//! throughout the test suite.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Movie, NewUser, User, UserUpdate};
use crate::database::store::{MovieStore, StoreError, UserStore};

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    movies: RwLock<Vec<Movie>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movies(movies: Vec<Movie>) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            movies: RwLock::new(movies),
        }
    }

    /// Load movie documents from a JSON array file.
    pub fn from_seed_file(path: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read movie seed file {}", path))?;
        let movies: Vec<Movie> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid movie documents in {}", path))?;
        tracing::info!("🎬 Loaded {} movies from {}", movies.len(), path);
        Ok(Self::with_movies(movies))
    }

    fn mutate_user<F>(&self, username: &str, f: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.write();
        let user = users.values_mut().find(|u| u.username == username)?;
        f(user);
        Some(user.clone())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write();
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(user.username));
        }
        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            email: user.email,
            birthday: user.birthday,
            favorite_movies: Vec::new(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write();
        if update.username != username && users.values().any(|u| u.username == update.username) {
            return Err(StoreError::Conflict(update.username));
        }
        let Some(user) = users.values_mut().find(|u| u.username == username) else {
            return Ok(None);
        };
        user.username = update.username;
        user.password_hash = update.password_hash;
        user.email = update.email;
        user.birthday = update.birthday;
        Ok(Some(user.clone()))
    }

    async fn add_favorite(&self, username: &str, movie_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.mutate_user(username, |u| u.favorite_movies.push(movie_id)))
    }

    async fn remove_favorite(&self, username: &str, movie_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.mutate_user(username, |u| u.favorite_movies.retain(|id| *id != movie_id)))
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write();
        let before = users.len();
        users.retain(|_, u| u.username != username);
        Ok(users.len() != before)
    }
}

#[async_trait]
impl MovieStore for InMemoryStore {
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self.movies.read().clone())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError> {
        Ok(self.movies.read().iter().find(|m| m.title == title).cloned())
    }

    async fn find_by_genre(&self, genre: &str) -> Result<Option<Movie>, StoreError> {
        Ok(self.movies.read().iter().find(|m| m.genre.name == genre).cloned())
    }

    async fn find_by_director(&self, director: &str) -> Result<Option<Movie>, StoreError> {
        Ok(self.movies.read().iter().find(|m| m.director.name == director).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            email: format!("{}@example.com", username),
            birthday: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_username() {
        let store = InMemoryStore::new();
        store.create_user(new_user("alice12")).await.unwrap();
        let err = store.create_user(new_user("alice12")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_lookup_by_username_and_id() {
        let store = InMemoryStore::new();
        let created = store.create_user(new_user("alice12")).await.unwrap();

        let by_name = store.find_by_username("alice12").await.unwrap().unwrap();
        let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_name, by_id);
        assert!(store.find_by_username("Alice12").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_favorites_keep_duplicates_and_remove_all() {
        let store = InMemoryStore::new();
        store.create_user(new_user("alice12")).await.unwrap();
        let movie = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.add_favorite("alice12", movie).await.unwrap();
        store.add_favorite("alice12", other).await.unwrap();
        let user = store.add_favorite("alice12", movie).await.unwrap().unwrap();
        assert_eq!(user.favorite_movies, vec![movie, other, movie]);

        let user = store.remove_favorite("alice12", movie).await.unwrap().unwrap();
        assert_eq!(user.favorite_movies, vec![other]);

        assert!(store.add_favorite("nobody1", movie).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_username_conflicts() {
        let store = InMemoryStore::new();
        store.create_user(new_user("alice12")).await.unwrap();
        store.create_user(new_user("bob99")).await.unwrap();

        let update = UserUpdate {
            username: "bob99".to_string(),
            password_hash: "$argon2id$other".to_string(),
            email: "a@example.com".to_string(),
            birthday: None,
        };
        let err = store.update_user("alice12", update).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let store = InMemoryStore::new();
        store.create_user(new_user("alice12")).await.unwrap();
        assert!(store.delete_user("alice12").await.unwrap());
        assert!(!store.delete_user("alice12").await.unwrap());
        assert!(store.find_by_username("alice12").await.unwrap().is_none());
    }
}
