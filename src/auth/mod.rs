//! # Authentication Module
//!
//! Password hashing, local credential verification, JWT issuance and
//! validation, and the middleware that guards protected routes.

pub mod credentials;
pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use errors::AuthError;
pub use jwt::JwtService;
pub use models::AuthUser;
pub use password::PasswordHasher;
