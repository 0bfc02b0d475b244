//! # Database Module
//!
//! Persistence for users and movies: the store traits, an in-memory backend,
//! and a PostgreSQL backend with its migrations.

pub mod connection;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod store;

pub use connection::{DatabaseConfig, DatabaseConnection};
pub use memory::InMemoryStore;
pub use models::*;
pub use store::{MovieStore, StoreError, UserStore};
