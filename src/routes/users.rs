//! # User Routes
//!
//! Registration, profile reads, profile updates, account deletion and the
//! favorite-movies list. Everything except registration requires a token;
//! writes to a user's record additionally require being that user.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::middleware::{AuthMiddleware, OwnerParam};
use crate::auth::models::AuthUser;
use crate::database::{NewUser, StoreError, UserUpdate};
use crate::errors::ApiError;
use crate::server::AppState;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

const MIN_USERNAME_LEN: usize = 5;

/// Body of `POST /users` and `PUT /users/{username}`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPayload {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

impl UserPayload {
    fn validate(&self) -> Result<(), ApiError> {
        let mut problems = Vec::new();
        if self.username.chars().count() < MIN_USERNAME_LEN {
            problems.push(format!("username must be at least {} characters", MIN_USERNAME_LEN));
        }
        if !self.username.chars().all(|c| c.is_ascii_alphanumeric()) {
            problems.push("username may only contain letters and digits".to_string());
        }
        if self.password.is_empty() {
            problems.push("password is required".to_string());
        }
        if !EMAIL_RE.is_match(&self.email) {
            problems.push("email does not appear to be valid".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(problems.join("; ")))
        }
    }
}

/// Map a username conflict to the name the caller asked for.
fn conflict_as(username: &str) -> impl FnOnce(StoreError) -> ApiError + '_ {
    move |err| match err {
        StoreError::Conflict(_) => ApiError::AlreadyExists(username.to_string()),
        other => other.into(),
    }
}

/// `POST /users`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthUser>), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    if state.users.find_by_username(&payload.username).await?.is_some() {
        return Err(ApiError::AlreadyExists(payload.username));
    }

    let password_hash = state.hasher.hash(&payload.password)?;
    let user = state
        .users
        .create_user(NewUser {
            username: payload.username.clone(),
            password_hash,
            email: payload.email,
            birthday: payload.birthday,
        })
        .await
        .map_err(conflict_as(&payload.username))?;

    info!("Registered user {}", user.username);
    Ok((StatusCode::CREATED, Json(AuthUser::from(user))))
}

/// `GET /users`
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<AuthUser>>, ApiError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(AuthUser::from).collect()))
}

/// `GET /users/{username}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<AuthUser>, ApiError> {
    match state.users.find_by_username(&username).await? {
        Some(user) => Ok(Json(AuthUser::from(user))),
        None => Err(ApiError::NotFound(username)),
    }
}

/// `PUT /users/{username}`: replaces username, password, email and birthday.
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<AuthUser>, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let password_hash = state.hasher.hash(&payload.password)?;
    let update = UserUpdate {
        username: payload.username.clone(),
        password_hash,
        email: payload.email,
        birthday: payload.birthday,
    };

    let updated = state
        .users
        .update_user(&username, update)
        .await
        .map_err(conflict_as(&payload.username))?
        .ok_or_else(|| ApiError::NotFound(username.clone()))?;

    info!("Updated user {} (now {})", username, updated.username);
    Ok(Json(AuthUser::from(updated)))
}

/// `DELETE /users/{username}`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(actor): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    if !state.users.delete_user(&username).await? {
        return Err(ApiError::NotFound(username));
    }
    info!("User {} deleted account {}", actor.id, username);
    Ok(Json(json!({ "message": format!("{} was deleted.", username) })))
}

/// `POST /users/{username}/movies/{movie_id}`
pub async fn add_favorite(
    State(state): State<AppState>,
    Path((username, movie_id)): Path<(String, Uuid)>,
) -> Result<Json<AuthUser>, ApiError> {
    let user = state
        .users
        .add_favorite(&username, movie_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(username.clone()))?;
    Ok(Json(AuthUser::from(user)))
}

/// `DELETE /users/{username}/movies/{movie_id}`
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((username, movie_id)): Path<(String, Uuid)>,
) -> Result<Json<AuthUser>, ApiError> {
    let user = state
        .users
        .remove_favorite(&username, movie_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(username.clone()))?;
    Ok(Json(AuthUser::from(user)))
}

pub fn create_user_routes(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/users", post(register));

    let authenticated = Router::new()
        .route("/users", get(list_users))
        .route("/users/{username}", get(get_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), AuthMiddleware::validate_token));

    // Layers run bottom-up: authentication first, then the ownership gate.
    let owner_only = Router::new()
        .route("/users/{username}", put(update_user).delete(delete_user))
        .route("/users/{username}/movies/{movie_id}", post(add_favorite).delete(remove_favorite))
        .route_layer(middleware::from_fn_with_state(OwnerParam("username"), AuthMiddleware::require_owner))
        .route_layer(middleware::from_fn_with_state(state, AuthMiddleware::validate_token));

    public.merge(authenticated).merge(owner_only)
}
