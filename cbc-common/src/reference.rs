//! Species reference lists
//!
//! Two independent membership lists keyed by normalized common name:
//! species expected for the region's checklist, and taxonomically real
//! species eligible for the total species count. A miss is never an error.
//! It is logged (warning for the expected list, info for the real list)
//! and the caller carries on with sibling species.

use crate::db::models::{normalize, Dataset, SpeciesEntry};
use crate::translate::species::Checklist;
use crate::Result;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn, Level};

/// Which reference list a lookup ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceList {
    Expected,
    Real,
}

impl ReferenceList {
    fn dataset(self) -> Dataset {
        match self {
            ReferenceList::Expected => Dataset::ExpectedSpecies,
            ReferenceList::Real => Dataset::RealSpecies,
        }
    }
}

/// A species name absent from one reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceLookupMiss {
    pub list: ReferenceList,
    pub common_name: String,
}

impl ReferenceLookupMiss {
    pub fn new(list: ReferenceList, common_name: &str) -> Self {
        Self {
            list,
            common_name: normalize(common_name),
        }
    }

    /// Severity of a miss: expected-list misses need manual entry, real-list
    /// misses only drop out of the total
    pub fn severity(&self) -> Level {
        match self.list {
            ReferenceList::Expected => Level::WARN,
            ReferenceList::Real => Level::INFO,
        }
    }

    /// Log the miss at its [`severity`](Self::severity)
    pub fn report(&self) {
        if self.severity() == Level::WARN {
            warn!(
                "Species '{}' not found in the expected species list; check the common name \
                 against the regional checklist or enter this species manually",
                self.common_name
            );
        } else {
            info!(
                "Species '{}' not found in the real species list and will not be included in \
                 the total species count; subspecies and generic 'sp.' entries need manual review",
                self.common_name
            );
        }
    }
}

impl fmt::Display for ReferenceLookupMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' not in {} list", self.common_name, self.list.dataset())
    }
}

/// Handle over both reference tables
#[derive(Clone)]
pub struct ReferenceLists {
    pool: SqlitePool,
}

impl ReferenceLists {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Case-insensitive membership in the expected species list
    pub async fn is_expected(&self, common_name: &str) -> Result<bool> {
        self.contains(ReferenceList::Expected, common_name).await
    }

    /// Case-insensitive membership in the real species list
    pub async fn is_real(&self, common_name: &str) -> Result<bool> {
        self.contains(ReferenceList::Real, common_name).await
    }

    async fn contains(&self, list: ReferenceList, common_name: &str) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE common_name = ?)",
            list.dataset().name()
        );
        let found: bool = sqlx::query_scalar(&sql)
            .bind(normalize(common_name))
            .fetch_one(&self.pool)
            .await?;

        if !found {
            ReferenceLookupMiss::new(list, common_name).report();
        }
        Ok(found)
    }

    pub async fn count(&self, list: ReferenceList) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", list.dataset().name());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Both lists in memory, for evaluating many species without a query each
    pub async fn snapshot(&self) -> Result<ReferenceSnapshot> {
        let expected: Vec<String> =
            sqlx::query_scalar("SELECT common_name FROM expected_species")
                .fetch_all(&self.pool)
                .await?;
        let real: Vec<String> = sqlx::query_scalar("SELECT common_name FROM real_species")
            .fetch_all(&self.pool)
            .await?;

        Ok(ReferenceSnapshot {
            expected: expected.into_iter().collect(),
            real: real.into_iter().collect(),
        })
    }
}

/// Insert reference entries on an open connection; repeated names keep the first entry
pub(crate) async fn insert_species(
    conn: &mut SqliteConnection,
    list: ReferenceList,
    entries: &[SpeciesEntry],
) -> Result<usize> {
    let sql = format!(
        "INSERT INTO {} (common_name, scientific_name{}) VALUES (?, ?{}) ON CONFLICT(common_name) DO NOTHING",
        list.dataset().name(),
        if list == ReferenceList::Real { ", taxonomic_id" } else { "" },
        if list == ReferenceList::Real { ", ?" } else { "" },
    );

    let mut inserted = 0;
    for entry in entries {
        let mut query = sqlx::query(&sql)
            .bind(normalize(&entry.common_name))
            .bind(entry.scientific_name.as_deref());
        if list == ReferenceList::Real {
            query = query.bind(entry.taxonomic_id);
        }

        let affected = query.execute(&mut *conn).await?.rows_affected();
        if affected == 0 {
            debug!("Repeated {} entry '{}' ignored", list.dataset(), entry.common_name);
        }
        inserted += affected as usize;
    }

    Ok(inserted)
}

/// In-memory copy of both reference lists
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    expected: HashSet<String>,
    real: HashSet<String>,
}

impl ReferenceSnapshot {
    pub fn new<E, R>(expected: E, real: R) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        Self {
            expected: expected.into_iter().map(|n| normalize(n.as_ref())).collect(),
            real: real.into_iter().map(|n| normalize(n.as_ref())).collect(),
        }
    }
}

impl Checklist for ReferenceSnapshot {
    fn is_expected(&self, common_name: &str) -> bool {
        self.expected.contains(&normalize(common_name))
    }

    fn is_real(&self, common_name: &str) -> bool {
        self.real.contains(&normalize(common_name))
    }
}
