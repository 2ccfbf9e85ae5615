//! Database operations for the shelter catalog.
//!
//! # Tables
//!
//! - `shelters` - the public catalog, including geocoded coordinates
//! - `users` - site accounts with argon2 password hashes
//! - `bookmarks` - user/shelter join table with set semantics
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run at startup
//! via [`run_migrations`].

pub mod shelters;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Filesystem error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(String),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure at startup.
    #[error("migration error: {0}")]
    Migration(String),

    /// Unique constraint violation (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The targeted row does not exist.
    #[error("not found")]
    NotFound,

    /// A stored value failed to decode (e.g. malformed JSON column).
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Open a SQLite connection pool with sensible defaults.
///
/// The database file is created if missing; WAL journaling and foreign keys
/// are enabled.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the connection cannot be
/// established.
pub async fn open(database_url: &str) -> Result<SqlitePool, RepositoryError> {
    ensure_parent_dir(database_url)?;

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the directory holding a file-backed database, if any.
fn ensure_parent_dir(database_url: &str) -> Result<(), RepositoryError> {
    let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }

    if let Some(parent) = std::path::Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| RepositoryError::Io(format!("creating {}: {e}", parent.display())))?;
    }

    Ok(())
}

/// Open an in-memory database for tests.
///
/// A single connection is used so every query sees the same in-memory
/// database.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the connection cannot be
/// established.
pub async fn open_in_memory() -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Run embedded migrations against the pool.
///
/// # Errors
///
/// Returns `RepositoryError::Migration` if any migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| RepositoryError::Migration(e.to_string()))?;

    Ok(())
}
