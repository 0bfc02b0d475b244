//! Configuration module for environment variables and application settings

use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;

const DEV_JWT_SECRET: &str = "dev_secret";

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Token signing and password hashing
    pub auth: AuthConfig,

    /// Postgres settings; `None` selects the in-memory store
    pub database: Option<DatabaseSettings>,

    /// Origins allowed by CORS (`*` allows any)
    pub cors_allowed_origins: Vec<String>,

    /// JSON file of movie documents for the in-memory store
    pub seed_movies_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_ttl_hours: i64,
    /// Argon2 memory cost in KiB
    pub password_memory_kib: u32,
    /// Argon2 time cost
    pub password_iterations: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("password_memory_kib", &self.password_memory_kib)
            .field("password_iterations", &self.password_iterations)
            .finish()
    }
}

#[derive(Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: usize,
    pub tls: bool,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The URL may carry the database password.
        f.debug_struct("DatabaseSettings")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("tls", &self.tls)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key/value source
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = jwt_secret(get("JWT_SECRET"), cfg!(debug_assertions))?;

        let port = match get("PORT") {
            Some(_) => parse_or(&get, "PORT", 8080u16)?,
            None => parse_or(&get, "SERVER_PORT", 8080u16)?,
        };

        let token_ttl_hours: i64 = parse_or(&get, "JWT_EXPIRY_HOURS", 168)?;
        if token_ttl_hours <= 0 {
            return Err(anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }

        let database = match get("DATABASE_URL").filter(|s| !s.is_empty()) {
            Some(url) => Some(DatabaseSettings {
                url,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 16)?,
                tls: parse_or(&get, "DATABASE_TLS", false)?,
            }),
            None => None,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            server: ServerConfig {
                host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_issuer: get("JWT_ISSUER").unwrap_or_else(|| "myflix-api".to_string()),
                token_ttl_hours,
                password_memory_kib: parse_or(&get, "PASSWORD_MEMORY_KIB", 19456)?,
                password_iterations: parse_or(&get, "PASSWORD_ITERATIONS", 2)?,
            },
            database,
            cors_allowed_origins,
            seed_movies_file: get("SEED_MOVIES_FILE").filter(|s| !s.is_empty()),
        })
    }
}

/// Only debug builds may fall back to the well-known development secret.
fn jwt_secret(value: Option<String>, allow_dev_secret: bool) -> Result<String> {
    match value.filter(|s| !s.is_empty()) {
        Some(secret) => Ok(secret),
        None if allow_dev_secret => {
            tracing::warn!("JWT_SECRET not set, signing tokens with the development secret");
            Ok(DEV_JWT_SECRET.to_string())
        }
        None => Err(anyhow!("JWT_SECRET must be set")),
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
