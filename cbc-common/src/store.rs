//! Fact store: normalized (kind, name, qualifier, value) observations
//!
//! Uniqueness of the (kind, name, qualifier) triple is enforced by the table's
//! unique key. A load that hits the key with the same value is a no-op for that
//! row; a different value is a [`Error::DuplicateFact`] and the whole load is
//! rolled back.

use crate::db::models::{ObservationRecord, RawRow};
use crate::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Insert statistics for one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    /// Rows identical to one already stored
    pub duplicates: usize,
}

/// Handle over the observation table
#[derive(Clone)]
pub struct FactStore {
    pool: SqlitePool,
}

impl FactStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert every row in one transaction, normalizing each before insert
    pub async fn load(&self, rows: &[RawRow]) -> Result<InsertSummary> {
        let mut tx = self.pool.begin().await?;
        let summary = insert_observations(&mut *tx, rows).await?;
        tx.commit().await?;

        info!(
            "Loaded {} observations ({} identical duplicates skipped)",
            summary.inserted, summary.duplicates
        );
        Ok(summary)
    }

    /// All observations of a kind, in insertion order
    pub async fn query(&self, kind: &str) -> Result<Vec<ObservationRecord>> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT kind, name, qualifier, value FROM observations WHERE kind = ? ORDER BY id",
        )
        .bind(kind.trim().to_lowercase())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ObservationRecord::from).collect())
    }

    /// Number of stored observations
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM observations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Insert rows on an open connection (usually inside a transaction)
pub(crate) async fn insert_observations(
    conn: &mut SqliteConnection,
    rows: &[RawRow],
) -> Result<InsertSummary> {
    let mut summary = InsertSummary::default();

    for row in rows {
        let record = row.normalize();
        let result = sqlx::query(
            "INSERT INTO observations (kind, name, qualifier, value) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.kind)
        .bind(&record.name)
        .bind(&record.qualifier)
        .bind(&record.value)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => summary.inserted += 1,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                let existing = stored_value(conn, &record).await?;
                if existing != record.value {
                    return Err(Error::DuplicateFact {
                        kind: record.kind,
                        name: record.name,
                        qualifier: record.qualifier,
                        existing,
                        incoming: record.value,
                    });
                }
                debug!(
                    "Skipping identical observation ({}, {}, {})",
                    record.kind, record.name, record.qualifier
                );
                summary.duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(summary)
}

async fn stored_value(conn: &mut SqliteConnection, record: &ObservationRecord) -> Result<String> {
    let value: String = sqlx::query_scalar(
        "SELECT value FROM observations WHERE kind = ? AND name = ? AND qualifier = ?",
    )
    .bind(&record.kind)
    .bind(&record.name)
    .bind(&record.qualifier)
    .fetch_one(&mut *conn)
    .await?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    async fn store() -> FactStore {
        FactStore::new(init_memory_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_load_normalizes_values() {
        let store = store().await;
        store
            .load(&[RawRow::new("Weather", "Cloud Cover", "AM", "  Local Fog ")])
            .await
            .unwrap();

        let rows = store.query("WEATHER").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "cloud cover");
        assert_eq!(rows[0].qualifier, "am");
        assert_eq!(rows[0].value, "local fog");
    }

    #[tokio::test]
    async fn test_identical_rows_are_not_duplicated() {
        let store = store().await;
        let row = RawRow::new("weather", "temperature", "min", "12");
        let summary = store.load(&[row.clone(), row.clone()]).await.unwrap();
        assert_eq!(summary, InsertSummary { inserted: 1, duplicates: 1 });

        // Re-ingest of the same triple in a later load is also a no-op
        store.load(&[row]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_conflicting_value_fails_and_rolls_back() {
        let store = store().await;
        let err = store
            .load(&[
                RawRow::new("effort", "hours", "foot", "3"),
                RawRow::new("weather", "temperature", "min", "12"),
                RawRow::new("Weather", "Temperature", "Min", "14"),
            ])
            .await
            .unwrap_err();

        match err {
            Error::DuplicateFact {
                existing, incoming, ..
            } => {
                assert_eq!(existing, "12");
                assert_eq!(incoming, "14");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_preserves_insertion_order() {
        let store = store().await;
        store
            .load(&[
                RawRow::new("species", "count", "snow bunting", "4"),
                RawRow::new("weather", "wind direction", "", "nw"),
                RawRow::new("species", "count", "american robin", "2"),
                RawRow::new("species", "count", "blue jay", "9"),
            ])
            .await
            .unwrap();

        let names: Vec<String> = store
            .query("species")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.qualifier)
            .collect();
        assert_eq!(names, vec!["snow bunting", "american robin", "blue jay"]);
    }
}
