// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite schema helpers shared by repository implementations.
//!
//! Applies migrations on start-up so integration tests and services see a
//! consistent database.

use sqlx::migrate::MigrateDatabase;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Runs pending migrations against the provided SQLite pool.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("Ensuring database schema is up to date");

    // Run migrations - sqlx will automatically track what's been applied
    sqlx::migrate!("../migrations").run(pool).await?;

    info!("Database schema is up to date");
    Ok(())
}

/// Creates a new SQLite database file if it doesn't exist.
///
/// `SqlitePool::connect` fails on a missing file unless connect options
/// request creation, so callers go through here first.
pub async fn create_database_if_missing(database_url: &str) -> Result<(), sqlx::Error> {
    if !sqlx::Sqlite::database_exists(database_url).await? {
        debug!("Database does not exist, creating: {}", database_url);
        sqlx::Sqlite::create_database(database_url).await?;
        info!("Created new SQLite database: {}", database_url);
    } else {
        debug!("Database already exists: {}", database_url);
    }
    Ok(())
}

/// Creates (when missing), connects, and migrates in one call.
///
/// # Arguments
///
/// * `database_url` - SQLite connection URL, e.g. `sqlite://./stages.db`
///
/// # Returns
///
/// * `Ok(SqlitePool)` - Connected pool with schema initialized
/// * `Err(sqlx::Error)` - Initialization failed
pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    create_database_if_missing(database_url).await?;
    let pool = SqlitePool::connect(database_url).await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database with schema, for tests and ephemeral sessions.
pub async fn initialize_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePool::connect("sqlite::memory:").await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_create_database_if_missing() {
        let temp = NamedTempFile::new().unwrap();
        let db_path = temp.path().to_str().unwrap();
        let db_url = format!("sqlite://{}", db_path);

        // Remove temp file so we can test creation
        drop(temp);

        // Should create the database
        create_database_if_missing(&db_url).await.unwrap();

        // Should succeed if already exists
        create_database_if_missing(&db_url).await.unwrap();
    }

    #[tokio::test]
    async fn test_initialize_database() {
        let temp = NamedTempFile::new().unwrap();
        let db_path = temp.path().to_str().unwrap();
        let db_url = format!("sqlite://{}", db_path);
        drop(temp);

        let pool = initialize_database(&db_url).await.unwrap();

        // Verify tables were created by checking for the stages table
        let result: i32 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='stages'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(result, 1, "Stages table should exist");
    }

    #[tokio::test]
    async fn test_ensure_schema_idempotent() {
        let pool = initialize_in_memory().await.unwrap();
        // Running migrations twice must be a no-op.
        ensure_schema(&pool).await.unwrap();
    }
}
