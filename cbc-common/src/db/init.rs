//! Database initialization
//!
//! Opens (or creates) the SQLite file, applies connection pragmas and brings
//! the schema up to date. The returned pool is the single storage handle the
//! caller passes to every component.

use crate::db::{migrations, table_schemas};
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every connection
pub const BUSY_TIMEOUT_MS: u64 = 5000;

/// Connections in a file-backed pool
pub const MAX_CONNECTIONS: u32 = 4;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL keeps readers unblocked during a reload
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    prepare_schema(&pool).await?;

    Ok(pool)
}

/// Initialize a private in-memory database
///
/// The pool is pinned to one connection that never expires; each SQLite
/// in-memory connection is its own database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    prepare_schema(&pool).await?;

    Ok(pool)
}

/// Create tables, sync columns and run migrations (idempotent)
async fn prepare_schema(pool: &SqlitePool) -> Result<()> {
    let mut conn = pool.acquire().await?;

    create_schema_version_table(&mut conn).await?;
    table_schemas::create_all_tables(&mut conn).await?;
    table_schemas::sync_all_table_schemas(&mut conn).await?;
    drop(conn);

    // Migrations run after the current tables exist so legacy rows have a destination
    migrations::run_migrations(pool).await?;

    Ok(())
}

async fn create_schema_version_table(conn: &mut sqlx::SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}
