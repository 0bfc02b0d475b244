//! Database Connection Management
//!
//! PostgreSQL backend for the user and movie stores, pooled through deadpool.
use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use crate::database::models::{FromRow, Movie, NewUser, User, UserUpdate};
use crate::database::store::{MovieStore, StoreError, UserStore};

const USER_COLUMNS: &str = "id, username, password_hash, email, birthday, favorite_movies";
const MOVIE_COLUMNS: &str = "id, title, description, genre_name, genre_description, \
     director_name, director_bio, actors, image_path, featured";

/// Database configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub max_size: usize,
    pub tls: bool,
    pub timeouts: deadpool_postgres::Timeouts,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("max_size", &self.max_size)
            .field("tls", &self.tls)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl DatabaseConfig {
    /// Create configuration from a `postgres://` URL
    pub fn from_url(url: &str, max_size: usize, tls: bool) -> Result<Self> {
        let config = tokio_postgres::Config::from_str(url)
            .context("Failed to parse DATABASE_URL")?;

        Ok(Self {
            host: config.get_hosts().first().map(|h| match h {
                tokio_postgres::config::Host::Tcp(s) => s.clone(),
                tokio_postgres::config::Host::Unix(s) => s.to_string_lossy().to_string(),
            }).unwrap_or_else(|| "localhost".to_string()),
            port: config.get_ports().first().copied().unwrap_or(5432),
            user: config.get_user().map(|u| u.to_string()).unwrap_or_default(),
            password: config.get_password().map(|p| String::from_utf8_lossy(p).to_string()).unwrap_or_default(),
            dbname: config.get_dbname().map(|d| d.to_string()).unwrap_or_default(),
            max_size,
            tls,
            timeouts: deadpool_postgres::Timeouts {
                wait: Some(Duration::from_secs(30)),
                create: Some(Duration::from_secs(30)),
                recycle: Some(Duration::from_secs(30)),
            },
        })
    }
}

/// Database connection wrapper
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: Pool,
}

impl DatabaseConnection {
    /// Create a new database connection with the provided configuration
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        let masked_host = format!("{}:{}/{}", config.host, config.port, config.dbname);
        tracing::info!("🔌 Connecting to database: {}", masked_host);

        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.dbname(&config.dbname);

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = if config.tls {
            let tls_connector = TlsConnector::builder().build().context("Failed to build TLS connector")?;
            Manager::from_config(pg_config, MakeTlsConnector::new(tls_connector), mgr_config)
        } else {
            Manager::from_config(pg_config, NoTls, mgr_config)
        };

        let pool = Pool::builder(mgr)
            .max_size(config.max_size)
            .wait_timeout(config.timeouts.wait)
            .create_timeout(config.timeouts.create)
            .recycle_timeout(config.timeouts.recycle)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .context("Failed to create database pool")?;

        let client = pool
            .get()
            .await
            .context("Failed to get connection from pool")?;
        client
            .query("SELECT 1", &[])
            .await
            .context("Failed to test database connection")?;

        tracing::info!("✅ Database connection established successfully");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn query_user(&self, sql: &str, params: &[&(dyn tokio_postgres::types::ToSql + Sync)]) -> Result<Option<User>, StoreError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(sql, params).await?;
        row.as_ref().map(decode::<User>).transpose()
    }

    async fn query_movie(&self, sql: &str, param: &str) -> Result<Option<Movie>, StoreError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(sql, &[&param]).await?;
        row.as_ref().map(decode::<Movie>).transpose()
    }
}

/// Decode a row, rejecting anything that does not fit the record shape.
fn decode<T: FromRow>(row: &Row) -> Result<T, StoreError> {
    T::from_row(row).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

#[async_trait]
impl UserStore for DatabaseConnection {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        self.query_user(&sql, &[&username]).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        self.query_user(&sql, &[&id]).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        let rows = client.query(&sql, &[]).await?;
        rows.iter().map(decode::<User>).collect()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO users (id, username, password_hash, email, birthday) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        let row = client
            .query_one(
                &sql,
                &[&Uuid::new_v4(), &user.username, &user.password_hash, &user.email, &user.birthday],
            )
            .await?;
        decode(&row)
    }

    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET username = $2, password_hash = $3, email = $4, birthday = $5 \
             WHERE username = $1 RETURNING {}",
            USER_COLUMNS
        );
        self.query_user(
            &sql,
            &[&username, &update.username, &update.password_hash, &update.email, &update.birthday],
        )
        .await
    }

    async fn add_favorite(&self, username: &str, movie_id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET favorite_movies = array_append(favorite_movies, $2) \
             WHERE username = $1 RETURNING {}",
            USER_COLUMNS
        );
        self.query_user(&sql, &[&username, &movie_id]).await
    }

    async fn remove_favorite(&self, username: &str, movie_id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET favorite_movies = array_remove(favorite_movies, $2) \
             WHERE username = $1 RETURNING {}",
            USER_COLUMNS
        );
        self.query_user(&sql, &[&username, &movie_id]).await
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let n = client
            .execute("DELETE FROM users WHERE username = $1", &[&username])
            .await?;
        Ok(n > 0)
    }
}

#[async_trait]
impl MovieStore for DatabaseConnection {
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {} FROM movies ORDER BY title", MOVIE_COLUMNS);
        let rows = client.query(&sql, &[]).await?;
        rows.iter().map(decode::<Movie>).collect()
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError> {
        let sql = format!("SELECT {} FROM movies WHERE title = $1 LIMIT 1", MOVIE_COLUMNS);
        self.query_movie(&sql, title).await
    }

    async fn find_by_genre(&self, genre: &str) -> Result<Option<Movie>, StoreError> {
        let sql = format!("SELECT {} FROM movies WHERE genre_name = $1 LIMIT 1", MOVIE_COLUMNS);
        self.query_movie(&sql, genre).await
    }

    async fn find_by_director(&self, director: &str) -> Result<Option<Movie>, StoreError> {
        let sql = format!("SELECT {} FROM movies WHERE director_name = $1 LIMIT 1", MOVIE_COLUMNS);
        self.query_movie(&sql, director).await
    }
}
