//! SQLite connection pool construction.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::DbError;

/// Open a pool against a SQLite database URL (e.g. `sqlite://grievances.db`
/// or `sqlite::memory:`), creating the file when missing.
///
/// SQLite is single-writer; a small pool with WAL journaling gives concurrent
/// readers while mutations serialize on the write lock, which is what the
/// per-grievance write ordering relies on.
pub async fn connect(database_url: &str) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(DbError::ConnectionFailed)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(DbError::ConnectionFailed)
}

/// Open an in-memory pool for tests.
///
/// A single connection keeps the in-memory database alive and shared across
/// the whole test.
pub async fn connect_in_memory() -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(DbError::ConnectionFailed)?
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(DbError::ConnectionFailed)
}
