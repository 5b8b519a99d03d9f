//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in the `schema_version` table.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field depend on them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Check before changing** - every step must be safe to re-run
//!
//! Column additions do not need a migration; `schema_sync` adds them on startup.

use crate::db::models::Dataset;
use crate::tracker;
use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    Ok(())
}

/// A table written by the legacy single-script loader
struct LegacyTable {
    table: &'static str,
    dataset: Dataset,
    /// Whether copied rows already match the current layout
    mark_loaded: bool,
    copy_sql: &'static str,
}

const LEGACY_TABLES: [LegacyTable; 3] = [
    // Legacy results were unique on name only; rows collapse onto an empty qualifier.
    // Their names ("temperature min", bare species names) predate the qualifier
    // column, so the dataset stays unmarked and the next load replaces them.
    LegacyTable {
        table: "cbc_results",
        dataset: Dataset::Observations,
        mark_loaded: false,
        copy_sql: r#"
            INSERT OR IGNORE INTO observations (kind, name, qualifier, value)
            SELECT lower(trim(result_type)), lower(trim(result_name)), '', lower(trim(result_value))
            FROM cbc_results
            WHERE result_type IS NOT NULL AND result_name IS NOT NULL AND result_value IS NOT NULL
            ORDER BY id
        "#,
    },
    LegacyTable {
        table: "mn_cbc_species",
        dataset: Dataset::ExpectedSpecies,
        mark_loaded: true,
        copy_sql: r#"
            INSERT OR IGNORE INTO expected_species (common_name, scientific_name)
            SELECT lower(trim(common_name)), lower(trim(species))
            FROM mn_cbc_species
            WHERE common_name IS NOT NULL
            ORDER BY id
        "#,
    },
    LegacyTable {
        table: "aou_real_species",
        dataset: Dataset::RealSpecies,
        mark_loaded: true,
        copy_sql: r#"
            INSERT OR IGNORE INTO real_species (taxonomic_id, common_name, scientific_name)
            SELECT aou_id, lower(trim(common_name)), lower(trim(species))
            FROM aou_real_species
            WHERE common_name IS NOT NULL
            ORDER BY id
        "#,
    },
];

/// Migration v1: import tables written by the legacy loader
///
/// **Background:** The legacy loader kept observations in `cbc_results` with a
/// unique index on `result_name` alone, and had no load tracking. Rows are
/// copied into the current tables (first row wins on conflict) and the legacy
/// tables are dropped. Species lists that received rows are marked loaded;
/// observations are left unmarked so the results file is loaded on the next run.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: import legacy loader tables");

    let mut tx = pool.begin().await?;
    for legacy in &LEGACY_TABLES {
        migrate_legacy_table(&mut *tx, legacy).await?;
    }
    tx.commit().await?;

    Ok(())
}

async fn migrate_legacy_table(conn: &mut SqliteConnection, legacy: &LegacyTable) -> Result<()> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name = ?
        )
        "#,
    )
    .bind(legacy.table)
    .fetch_one(&mut *conn)
    .await?;

    if !table_exists {
        return Ok(());
    }

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", legacy.table))
        .fetch_one(&mut *conn)
        .await?;
    let copied = sqlx::query(legacy.copy_sql)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if (copied as i64) < total {
        warn!(
            "  {} of {} rows in legacy table '{}' conflicted and were not copied",
            total - copied as i64,
            total,
            legacy.table
        );
    }

    sqlx::query(&format!("DROP TABLE {}", legacy.table))
        .execute(&mut *conn)
        .await?;

    if legacy.mark_loaded && copied > 0 {
        tracker::write_status(conn, legacy.dataset, true).await?;
    }

    info!(
        "  ✓ Copied {} rows from '{}' into '{}'",
        copied,
        legacy.table,
        legacy.dataset.name()
    );
    Ok(())
}
