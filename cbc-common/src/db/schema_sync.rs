//! Declarative table schemas
//!
//! Each table is declared once as a list of columns plus table-level unique keys
//! and indexes. The same declaration drives `CREATE TABLE`, the drop-and-recreate
//! used by forced reloads, and the column sync that brings an older database
//! up to date.
//!
//! # Usage
//!
//! ```rust,ignore
//! pub struct NotesTableSchema;
//!
//! impl TableSchema for NotesTableSchema {
//!     fn table_name(&self) -> &'static str { "notes" }
//!
//!     fn expected_columns(&self) -> Vec<ColumnDefinition> {
//!         vec![
//!             ColumnDefinition::new("id", "INTEGER").primary_key(),
//!             ColumnDefinition::new("body", "TEXT").not_null().default("''"),
//!         ]
//!     }
//! }
//!
//! SchemaSync::create_table(&mut conn, &NotesTableSchema).await?;
//! ```

use crate::Result;
use sqlx::{Row, SqliteConnection};
use tracing::{debug, info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "TIMESTAMP")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
    /// DEFAULT value (SQL literal)
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            unique: false,
            default_value: None,
        }
    }

    /// Mark column as PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark column as UNIQUE
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set DEFAULT value
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Column clause as it appears inside `CREATE TABLE`
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        sql
    }
}

/// Defines the expected schema for a database table
pub trait TableSchema: Sync {
    /// Table name in database
    fn table_name(&self) -> &'static str;

    /// Expected column definitions (order matters for new table creation)
    fn expected_columns(&self) -> Vec<ColumnDefinition>;

    /// Column sets that must be unique together
    fn unique_keys(&self) -> Vec<&'static [&'static str]> {
        Vec::new()
    }

    /// Secondary indexes as (index name, columns)
    fn indexes(&self) -> Vec<(&'static str, &'static [&'static str])> {
        Vec::new()
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table
    fn create_sql(&self) -> String {
        let mut clauses: Vec<String> = self
            .expected_columns()
            .iter()
            .map(ColumnDefinition::to_sql)
            .collect();
        for key in self.unique_keys() {
            clauses.push(format!("UNIQUE ({})", key.join(", ")));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.table_name(),
            clauses.join(",\n    ")
        )
    }
}

/// Creates, recreates and synchronizes declared tables
pub struct SchemaSync;

impl SchemaSync {
    /// Create the table and its indexes if they do not exist
    pub async fn create_table(conn: &mut SqliteConnection, schema: &dyn TableSchema) -> Result<()> {
        sqlx::query(&schema.create_sql()).execute(&mut *conn).await?;

        for (index_name, columns) in schema.indexes() {
            let sql = format!(
                "CREATE INDEX IF NOT EXISTS {} ON {}({})",
                index_name,
                schema.table_name(),
                columns.join(", ")
            );
            sqlx::query(&sql).execute(&mut *conn).await?;
        }

        Ok(())
    }

    /// Drop the table (with its indexes) and create it empty
    pub async fn recreate_table(conn: &mut SqliteConnection, schema: &dyn TableSchema) -> Result<()> {
        let sql = format!("DROP TABLE IF EXISTS {}", schema.table_name());
        sqlx::query(&sql).execute(&mut *conn).await?;
        debug!("Dropped table '{}'", schema.table_name());

        Self::create_table(conn, schema).await
    }

    /// Check if table exists
    pub async fn table_exists(conn: &mut SqliteConnection, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type='table' AND name = ?
            )
            "#,
        )
        .bind(table_name)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }

    /// Column names of an existing table, in table order
    pub async fn introspect_columns(
        conn: &mut SqliteConnection,
        table_name: &str,
    ) -> Result<Vec<String>> {
        let sql = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

        Ok(rows.iter().map(|row| row.get::<String, _>("name")).collect())
    }

    /// Add any declared column the existing table lacks
    ///
    /// Only missing columns are repaired. Constraint changes need a
    /// migration or a forced reload, which recreates the table.
    pub async fn sync_table(conn: &mut SqliteConnection, schema: &dyn TableSchema) -> Result<()> {
        let table_name = schema.table_name();

        if !Self::table_exists(conn, table_name).await? {
            warn!(
                "Table '{}' does not exist - should be created before schema sync",
                table_name
            );
            return Ok(());
        }

        let actual = Self::introspect_columns(conn, table_name).await?;
        let missing: Vec<ColumnDefinition> = schema
            .expected_columns()
            .into_iter()
            .filter(|column| !actual.iter().any(|name| name == &column.name))
            .collect();

        if missing.is_empty() {
            debug!("Schema up to date for '{}'", table_name);
            return Ok(());
        }

        for column in missing {
            Self::add_column(conn, table_name, &column).await?;
        }

        Ok(())
    }

    /// Add missing column to table via ALTER TABLE ADD COLUMN
    async fn add_column(
        conn: &mut SqliteConnection,
        table: &str,
        column: &ColumnDefinition,
    ) -> Result<()> {
        // SQLite cannot add PRIMARY KEY or UNIQUE columns, and NOT NULL needs a default
        if column.primary_key || column.unique {
            warn!(
                "Cannot add constrained column {}.{} via ALTER TABLE; adding it unconstrained",
                table, column.name
            );
        }

        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            table, column.name, column.sql_type
        );
        match (&column.default_value, column.not_null) {
            (Some(default), true) => sql.push_str(&format!(" NOT NULL DEFAULT {}", default)),
            (Some(default), false) => sql.push_str(&format!(" DEFAULT {}", default)),
            (None, true) => warn!(
                "Cannot add NOT NULL column {}.{} without DEFAULT value; column will be nullable",
                table, column.name
            ),
            (None, false) => {}
        }

        sqlx::query(&sql).execute(&mut *conn).await?;
        info!("Added column: {}.{} ({})", table, column.name, column.sql_type);

        Ok(())
    }
}
