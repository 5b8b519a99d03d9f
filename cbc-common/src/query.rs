//! Read-only accessors over the fact store
//!
//! Every input is trimmed and lower-cased the same way values are on ingest,
//! so callers may pass names in any case.

use crate::db::models::{normalize, ObservationRecord};
use crate::Result;
use sqlx::SqlitePool;
use tracing::{debug, warn};

const SELECT_COLUMNS: &str = "SELECT kind, name, qualifier, value FROM observations";

#[derive(Clone)]
pub struct Observations {
    pool: SqlitePool,
}

impl Observations {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Unqualified value for (kind, name)
    ///
    /// Only the record with an empty qualifier answers. None on zero matches,
    /// and None with a warning when the pair only has qualified records.
    pub async fn get_value(&self, kind: &str, name: &str) -> Result<Option<String>> {
        let records = self.list_by_kind_and_name(kind, name).await?;
        let qualified = records.iter().filter(|r| !r.qualifier.is_empty()).count();

        match records.into_iter().find(|r| r.qualifier.is_empty()) {
            Some(record) => Ok(Some(record.value)),
            None if qualified == 0 => {
                debug!("No observation for ({}, {})", normalize(kind), normalize(name));
                Ok(None)
            }
            None => {
                warn!(
                    "Ambiguous lookup ({}, {}): {} qualified records, use a qualified lookup",
                    normalize(kind),
                    normalize(name),
                    qualified
                );
                Ok(None)
            }
        }
    }

    /// Exact (kind, name, qualifier) lookup
    pub async fn get_qualified_value(
        &self,
        kind: &str,
        name: &str,
        qualifier: &str,
    ) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM observations WHERE kind = ? AND name = ? AND qualifier = ?",
        )
        .bind(normalize(kind))
        .bind(normalize(name))
        .bind(normalize(qualifier))
        .fetch_optional(&self.pool)
        .await?;

        if value.is_none() {
            debug!(
                "No observation for ({}, {}, {})",
                normalize(kind),
                normalize(name),
                normalize(qualifier)
            );
        }
        Ok(value)
    }

    pub async fn list_by_kind(&self, kind: &str) -> Result<Vec<ObservationRecord>> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(&format!(
            "{SELECT_COLUMNS} WHERE kind = ? ORDER BY id"
        ))
        .bind(normalize(kind))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ObservationRecord::from).collect())
    }

    /// Every qualifier recorded for (kind, name), e.g. all species counts
    pub async fn list_by_kind_and_name(
        &self,
        kind: &str,
        name: &str,
    ) -> Result<Vec<ObservationRecord>> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(&format!(
            "{SELECT_COLUMNS} WHERE kind = ? AND name = ? ORDER BY id"
        ))
        .bind(normalize(kind))
        .bind(normalize(name))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ObservationRecord::from).collect())
    }

    /// Records whose name starts with `name_prefix`, e.g. the precipitation family
    pub async fn list_by_kind_and_name_prefix(
        &self,
        kind: &str,
        name_prefix: &str,
    ) -> Result<Vec<ObservationRecord>> {
        // Trailing whitespace is significant in a prefix
        let prefix = name_prefix.trim_start().to_lowercase();
        let pattern = format!("{}%", escape_like(&prefix));
        let rows = sqlx::query_as::<_, (String, String, String, String)>(&format!(
            r"{SELECT_COLUMNS} WHERE kind = ? AND name LIKE ? ESCAPE '\' ORDER BY id"
        ))
        .bind(normalize(kind))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ObservationRecord::from).collect())
    }
}

/// Escape LIKE wildcards so a prefix matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
