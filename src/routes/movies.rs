//! # Movie Routes
//!
//! Read-only access to the movie collection. All endpoints require a valid
//! bearer token.

use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::get,
    Router,
};

use crate::auth::middleware::AuthMiddleware;
use crate::database::{Director, Genre, Movie};
use crate::errors::ApiError;
use crate::server::AppState;

/// `GET /movies`
pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, ApiError> {
    Ok(Json(state.movies.list_movies().await?))
}

/// `GET /movies/{title}`
pub async fn get_movie(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Movie>, ApiError> {
    let movie = state.movies.find_by_title(&title).await?;
    movie.map(Json).ok_or(ApiError::NotFound(title))
}

/// `GET /movies/genres/{name}`: genre details taken from a movie of that genre
pub async fn get_genre(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Genre>, ApiError> {
    let movie = state.movies.find_by_genre(&name).await?;
    movie.map(|m| Json(m.genre)).ok_or(ApiError::NotFound(name))
}

/// `GET /movies/directors/{name}`
pub async fn get_director(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Director>, ApiError> {
    let movie = state.movies.find_by_director(&name).await?;
    movie.map(|m| Json(m.director)).ok_or(ApiError::NotFound(name))
}

pub fn create_movie_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{title}", get(get_movie))
        .route("/movies/genres/{name}", get(get_genre))
        .route("/movies/directors/{name}", get(get_director))
        .route_layer(middleware::from_fn_with_state(state, AuthMiddleware::validate_token))
}
