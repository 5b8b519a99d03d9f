//! Load tracker
//!
//! Per-dataset "is this table populated" state. A dataset already marked
//! loaded is skipped unless the caller forces a reload. A (re)load drops and
//! recreates the dataset's table, populates it and marks it loaded inside one
//! transaction, so a failure part way leaves the previous table and status
//! untouched.

use crate::db::models::{Dataset, LoadStatus, RawRow, SpeciesEntry};
use crate::db::schema_sync::SchemaSync;
use crate::db::table_schemas::dataset_schema;
use crate::reference::{self, ReferenceList};
use crate::source::DatasetSource;
use crate::{store, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

/// What `load_all` did with one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Already loaded and not forced
    Skipped,
    Loaded { rows: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetOutcome {
    pub dataset: Dataset,
    #[serde(flatten)]
    pub outcome: LoadOutcome,
}

/// Outcome of every dataset, in load order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub datasets: Vec<DatasetOutcome>,
}

impl LoadReport {
    pub fn outcome(&self, dataset: Dataset) -> Option<LoadOutcome> {
        self.datasets
            .iter()
            .find(|d| d.dataset == dataset)
            .map(|d| d.outcome)
    }

    /// Rows inserted across all datasets
    pub fn rows_inserted(&self) -> usize {
        self.datasets
            .iter()
            .map(|d| match d.outcome {
                LoadOutcome::Loaded { rows } => rows,
                LoadOutcome::Skipped => 0,
            })
            .sum()
    }
}

#[derive(Clone)]
pub struct LoadTracker {
    pool: SqlitePool,
}

impl LoadTracker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn is_loaded(&self, dataset: Dataset) -> Result<bool> {
        Ok(self
            .status(dataset)
            .await?
            .map(|s| s.is_loaded)
            .unwrap_or(false))
    }

    /// Stored status, or `None` if the dataset has never been recorded
    pub async fn status(&self, dataset: Dataset) -> Result<Option<LoadStatus>> {
        let row = sqlx::query_as::<_, (String, bool, Option<DateTime<Utc>>)>(
            "SELECT dataset, is_loaded, loaded_at FROM load_status WHERE dataset = ?",
        )
        .bind(dataset.name())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(dataset, is_loaded, loaded_at)| LoadStatus {
            dataset,
            is_loaded,
            loaded_at,
        }))
    }

    /// Idempotent upsert of the loaded flag
    pub async fn mark_loaded(&self, dataset: Dataset) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        write_status(&mut conn, dataset, true).await
    }

    /// Load every dataset not yet loaded, or all of them when `force` is set
    ///
    /// Stops at the first dataset that fails; datasets loaded before it stay loaded.
    pub async fn load_all(&self, force: bool, source: &dyn DatasetSource) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for dataset in Dataset::ALL {
            let outcome = self.load_dataset(dataset, force, source).await?;
            report.datasets.push(DatasetOutcome { dataset, outcome });
        }
        Ok(report)
    }

    /// Load one dataset independently of the other two
    pub async fn load_dataset(
        &self,
        dataset: Dataset,
        force: bool,
        source: &dyn DatasetSource,
    ) -> Result<LoadOutcome> {
        if !force && self.is_loaded(dataset).await? {
            info!("Dataset '{}' already loaded, skipping", dataset);
            return Ok(LoadOutcome::Skipped);
        }

        if force {
            info!("Force reload of dataset '{}'", dataset);
        }

        let rows = match self.reload(dataset, source).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Loading dataset '{}' failed, previous contents kept: {}", dataset, e);
                return Err(e);
            }
        };

        info!("Loaded {} rows into '{}'", rows, dataset);
        Ok(LoadOutcome::Loaded { rows })
    }

    async fn reload(&self, dataset: Dataset, source: &dyn DatasetSource) -> Result<usize> {
        // Read before opening the transaction so a bad file never touches the table
        let pending = match dataset {
            Dataset::Observations => Pending::Observations(source.observations()?),
            Dataset::ExpectedSpecies => {
                Pending::Species(ReferenceList::Expected, source.expected_species()?)
            }
            Dataset::RealSpecies => Pending::Species(ReferenceList::Real, source.real_species()?),
        };

        let mut tx = self.pool.begin().await?;
        SchemaSync::recreate_table(&mut *tx, dataset_schema(dataset)).await?;

        let rows = match &pending {
            Pending::Observations(rows) => {
                store::insert_observations(&mut *tx, rows).await?.inserted
            }
            Pending::Species(list, entries) => {
                reference::insert_species(&mut *tx, *list, entries).await?
            }
        };

        write_status(&mut *tx, dataset, true).await?;
        tx.commit().await?;

        Ok(rows)
    }
}

enum Pending {
    Observations(Vec<RawRow>),
    Species(ReferenceList, Vec<SpeciesEntry>),
}

/// Upsert a dataset's status row on an open connection
pub(crate) async fn write_status(
    conn: &mut SqliteConnection,
    dataset: Dataset,
    loaded: bool,
) -> Result<()> {
    let loaded_at = loaded.then(Utc::now);
    sqlx::query(
        r#"
        INSERT INTO load_status (dataset, is_loaded, loaded_at) VALUES (?, ?, ?)
        ON CONFLICT(dataset) DO UPDATE SET
            is_loaded = excluded.is_loaded,
            loaded_at = excluded.loaded_at
        "#,
    )
    .bind(dataset.name())
    .bind(loaded)
    .bind(loaded_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
