//! # Server Module
//!
//! HTTP server setup and route configuration for the myflix API.

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::{JwtService, PasswordHasher};
use crate::config::Config;
use crate::database::{
    migrations::run_migrations, DatabaseConfig, DatabaseConnection, InMemoryStore, MovieStore, UserStore,
};
use crate::routes::{self, health::ping};

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub movies: Arc<dyn MovieStore>,
    pub jwt_service: Arc<JwtService>,
    pub hasher: Arc<PasswordHasher>,
}

impl AppState {
    /// Wire up the auth services and the configured store backend.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let jwt_service = Arc::new(JwtService::new(
            &config.auth.jwt_secret,
            &config.auth.jwt_issuer,
            Duration::hours(config.auth.token_ttl_hours),
        ));
        let hasher = Arc::new(
            PasswordHasher::new(config.auth.password_memory_kib, config.auth.password_iterations)
                .context("Invalid password hashing parameters")?,
        );

        match &config.database {
            Some(db) => {
                let db_config = DatabaseConfig::from_url(&db.url, db.max_connections, db.tls)?;
                let connection = Arc::new(
                    DatabaseConnection::new(db_config)
                        .await
                        .context("Failed to connect to DB")?,
                );
                run_migrations(connection.pool()).await?;
                if config.seed_movies_file.is_some() {
                    tracing::warn!("SEED_MOVIES_FILE is ignored when DATABASE_URL is set");
                }
                Ok(Self {
                    users: connection.clone(),
                    movies: connection,
                    jwt_service,
                    hasher,
                })
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store (data is lost on restart)");
                let store = Arc::new(match &config.seed_movies_file {
                    Some(path) => InMemoryStore::from_seed_file(path)?,
                    None => InMemoryStore::new(),
                });
                Ok(Self {
                    users: store.clone(),
                    movies: store,
                    jwt_service,
                    hasher,
                })
            }
        }
    }
}

/// CORS policy for the configured origins; `*` allows any origin.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin {}", o))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ]))
}

/// Assemble the full router
pub fn build_app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .merge(routes::auth::create_auth_routes())
        .merge(routes::users::create_user_routes(state.clone()))
        .merge(routes::movies::create_movie_routes(state.clone()))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Starts the HTTP server and serves until Ctrl-C.
pub async fn start(config: Config) -> Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = build_app(state, cors_layer(&config.cors_allowed_origins)?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} - port may already be in use", addr))?;

    tracing::info!("🚀 myflix API listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);
    tracing::info!("🔐 Tokens valid for {}h, issuer {}", config.auth.token_ttl_hours, config.auth.jwt_issuer);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
