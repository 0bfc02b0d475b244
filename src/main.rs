//! # myflix API
//!
//! REST backend for a movie catalogue and its users, built with Axum and
//! Tokio.
//!
//! ## Features
//! - Username/password login issuing HS256 bearer tokens
//! - Token-guarded user and movie endpoints
//! - Ownership checks on every write to a user's record
//! - PostgreSQL storage with embedded migrations, or an in-memory store for
//!   local development
//!
//! ## Architecture
//! - `server`: router assembly, shared state and startup
//! - `config`: environment variable configuration
//! - `auth`: password hashing, credential verification, JWT and middleware
//! - `database`: store traits and their backends
//! - `routes`: HTTP handlers per resource
//! - `errors`: the HTTP error type
//!
//! ## Running the Server
//! ```bash
//! JWT_SECRET=change-me cargo run
//! ```
//!
//! The server listens on `http://0.0.0.0:8080` by default.

mod auth;
mod config;
mod database;
mod errors;
mod routes;
mod server;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set variables directly.
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    tracing::info!("🏁 Starting myflix API...");
    tracing::info!("📦 Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("🏗️  Build profile: {}", if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    });

    let config = config::Config::from_env()?;
    tracing::debug!("Configuration: {:?}", config);

    server::start(config).await
}
