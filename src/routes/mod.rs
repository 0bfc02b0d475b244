//! # Routes Module
//!
//! - HTTP route handlers, grouped by resource.
//! - Each module exposes a `create_*_routes` constructor that `server.rs`
//!   merges into the main router.

/// Liveness endpoint
pub mod health;

/// Login endpoint
pub mod auth;

/// User registration, profile and favorites endpoints
pub mod users;

/// Movie catalogue endpoints
pub mod movies;
