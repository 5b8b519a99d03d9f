//! Table schema definitions
//!
//! Single source of truth for every table the store owns: the observation
//! fact table, both species reference lists and the load status table.

use crate::db::models::Dataset;
use crate::db::schema_sync::{ColumnDefinition, SchemaSync, TableSchema};
use crate::Result;
use sqlx::SqliteConnection;
use tracing::debug;

const OBSERVATION_KEY: &[&str] = &["kind", "name", "qualifier"];
const OBSERVATION_KIND_NAME: &[&str] = &["kind", "name"];

/// Normalized observation facts, one row per (kind, name, qualifier)
pub struct ObservationsTableSchema;

impl TableSchema for ObservationsTableSchema {
    fn table_name(&self) -> &'static str {
        Dataset::Observations.name()
    }

    fn expected_columns(&self) -> Vec<ColumnDefinition> {
        vec![
            // Row id doubles as insertion order
            ColumnDefinition::new("id", "INTEGER").primary_key(),
            ColumnDefinition::new("kind", "TEXT").not_null(),
            ColumnDefinition::new("name", "TEXT").not_null(),
            ColumnDefinition::new("qualifier", "TEXT")
                .not_null()
                .default("''"),
            ColumnDefinition::new("value", "TEXT").not_null(),
        ]
    }

    fn unique_keys(&self) -> Vec<&'static [&'static str]> {
        vec![OBSERVATION_KEY]
    }

    fn indexes(&self) -> Vec<(&'static str, &'static [&'static str])> {
        vec![("idx_observations_kind_name", OBSERVATION_KIND_NAME)]
    }
}

/// Species the operator is expected to report for the region
pub struct ExpectedSpeciesTableSchema;

impl TableSchema for ExpectedSpeciesTableSchema {
    fn table_name(&self) -> &'static str {
        Dataset::ExpectedSpecies.name()
    }

    fn expected_columns(&self) -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER").primary_key(),
            ColumnDefinition::new("common_name", "TEXT")
                .not_null()
                .unique(),
            ColumnDefinition::new("scientific_name", "TEXT"),
        ]
    }
}

/// Taxonomically real species, used for the total species count
pub struct RealSpeciesTableSchema;

impl TableSchema for RealSpeciesTableSchema {
    fn table_name(&self) -> &'static str {
        Dataset::RealSpecies.name()
    }

    fn expected_columns(&self) -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER").primary_key(),
            ColumnDefinition::new("taxonomic_id", "INTEGER"),
            ColumnDefinition::new("common_name", "TEXT")
                .not_null()
                .unique(),
            ColumnDefinition::new("scientific_name", "TEXT"),
        ]
    }
}

/// Per-dataset load state
pub struct LoadStatusTableSchema;

impl TableSchema for LoadStatusTableSchema {
    fn table_name(&self) -> &'static str {
        "load_status"
    }

    fn expected_columns(&self) -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("dataset", "TEXT").primary_key(),
            ColumnDefinition::new("is_loaded", "INTEGER")
                .not_null()
                .default("0"),
            ColumnDefinition::new("loaded_at", "TIMESTAMP"),
        ]
    }
}

/// Schema of the table backing a dataset
pub fn dataset_schema(dataset: Dataset) -> &'static dyn TableSchema {
    match dataset {
        Dataset::Observations => &ObservationsTableSchema,
        Dataset::ExpectedSpecies => &ExpectedSpeciesTableSchema,
        Dataset::RealSpecies => &RealSpeciesTableSchema,
    }
}

/// Create every table the store owns (no-op for existing tables)
pub async fn create_all_tables(conn: &mut SqliteConnection) -> Result<()> {
    SchemaSync::create_table(conn, &LoadStatusTableSchema).await?;
    for dataset in Dataset::ALL {
        SchemaSync::create_table(conn, dataset_schema(dataset)).await?;
    }
    Ok(())
}

/// Add columns declared here but missing from an older database
pub async fn sync_all_table_schemas(conn: &mut SqliteConnection) -> Result<()> {
    debug!("Synchronizing table schemas");

    SchemaSync::sync_table(conn, &LoadStatusTableSchema).await?;
    for dataset in Dataset::ALL {
        SchemaSync::sync_table(conn, dataset_schema(dataset)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_uniqueness_spans_three_columns() {
        let sql = ObservationsTableSchema.create_sql();
        assert!(sql.contains("UNIQUE (kind, name, qualifier)"));
        assert!(sql.contains("qualifier TEXT NOT NULL DEFAULT ''"));
    }

    #[test]
    fn test_dataset_schema_table_names() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset_schema(dataset).table_name(), dataset.name());
        }
    }

    #[test]
    fn test_reference_lists_unique_on_common_name() {
        assert!(ExpectedSpeciesTableSchema
            .expected_columns()
            .iter()
            .any(|c| c.name == "common_name" && c.not_null && c.unique));
        assert!(RealSpeciesTableSchema
            .expected_columns()
            .iter()
            .any(|c| c.name == "common_name" && c.not_null && c.unique));
    }
}
