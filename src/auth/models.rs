//! Authentication Models
//!
//! Data structures for authentication requests, responses, and user information.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::User;

/// Public identity of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub favorite_movies: Vec<Uuid>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            birthday: user.birthday,
            favorite_movies: user.favorite_movies,
        }
    }
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token response after successful authentication
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user: AuthUser,
    pub token: String,
    pub token_type: String,
    pub expires_at: i64,
}

impl TokenResponse {
    pub fn new(token: String, expires_at: i64, user: AuthUser) -> Self {
        Self {
            user,
            token,
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }
}
