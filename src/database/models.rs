//! Database Models
//!
//! Record types for the two collections (users, movies) and the strict
//! row decoding used by the Postgres backend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> where Self: Sized;
}

// ============================================================================
// USER MODELS
// ============================================================================

/// Stored user account. `password_hash` always holds a hasher output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub favorite_movies: Vec<Uuid>,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            email: row.try_get("email")?,
            birthday: row.try_get("birthday")?,
            favorite_movies: row.try_get("favorite_movies")?,
        })
    }
}

/// Fields needed to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

/// Full replacement of a user's editable fields.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

// ============================================================================
// MOVIE MODELS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Genre {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Director {
    pub name: String,
    pub bio: String,
}

/// Movie document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub genre: Genre,
    pub director: Director,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl FromRow for Movie {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            genre: Genre {
                name: row.try_get("genre_name")?,
                description: row.try_get("genre_description")?,
            },
            director: Director {
                name: row.try_get("director_name")?,
                bio: row.try_get("director_bio")?,
            },
            actors: row.try_get("actors")?,
            image_path: row.try_get("image_path")?,
            featured: row.try_get("featured")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_document_rejects_unknown_fields() {
        let doc = serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "Alien",
            "description": "In space no one can hear you scream.",
            "genre": { "name": "Horror", "description": "Scary" },
            "director": { "name": "Ridley Scott", "bio": "English filmmaker" },
            "Title": "duplicate with other casing"
        });
        assert!(serde_json::from_value::<Movie>(doc).is_err());
    }

    #[test]
    fn test_movie_document_optional_fields_default() {
        let doc = serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "Alien",
            "description": "In space no one can hear you scream.",
            "genre": { "name": "Horror", "description": "Scary" },
            "director": { "name": "Ridley Scott", "bio": "English filmmaker" }
        });
        let movie: Movie = serde_json::from_value(doc).unwrap();
        assert!(movie.actors.is_empty());
        assert_eq!(movie.image_path, None);
        assert!(!movie.featured);
    }
}
