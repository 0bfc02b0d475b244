//! Login route: exchanges a username and password for a bearer token.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::auth::{
    credentials::verify_credentials,
    models::{LoginRequest, TokenResponse},
};
use crate::errors::ApiError;
use crate::server::AppState;

/// `POST /login`
///
/// Responds with the user's identity and a signed token, or 401 with a
/// generic message whether the username or the password was wrong.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload?;
    let user = verify_credentials(
        state.users.as_ref(),
        &state.hasher,
        &payload.username,
        &payload.password,
    )
    .await?;

    let issued = state.jwt_service.issue(&user)?;
    tracing::info!("{} logged in", user.username);

    Ok(Json(TokenResponse::new(issued.token, issued.expires_at, user)))
}

pub fn create_auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
