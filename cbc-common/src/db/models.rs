//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trim and lower-case a cell the way every dataset is normalized on ingest
pub fn normalize(cell: &str) -> String {
    cell.trim().to_lowercase()
}

/// One row from the observations source, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub kind: String,
    pub name: String,
    pub qualifier: String,
    pub value: String,
}

impl RawRow {
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        qualifier: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            qualifier: qualifier.into(),
            value: value.into(),
        }
    }

    /// Trimmed, lower-cased record ready for insert
    pub fn normalize(&self) -> ObservationRecord {
        ObservationRecord {
            kind: normalize(&self.kind),
            name: normalize(&self.name),
            qualifier: normalize(&self.qualifier),
            value: normalize(&self.value),
        }
    }
}

/// The atomic fact: (kind, name, qualifier) is unique within the store.
///
/// An unqualified observation carries an empty qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub kind: String,
    pub name: String,
    pub qualifier: String,
    pub value: String,
}

impl From<(String, String, String, String)> for ObservationRecord {
    fn from((kind, name, qualifier, value): (String, String, String, String)) -> Self {
        Self {
            kind,
            name,
            qualifier,
            value,
        }
    }
}

/// Entry of either species reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub common_name: String,
    pub scientific_name: Option<String>,
    pub taxonomic_id: Option<i64>,
}

impl SpeciesEntry {
    pub fn new(common_name: &str) -> Self {
        Self {
            common_name: normalize(common_name),
            scientific_name: None,
            taxonomic_id: None,
        }
    }

    pub fn with_scientific_name(mut self, scientific_name: &str) -> Self {
        let name = normalize(scientific_name);
        self.scientific_name = (!name.is_empty()).then_some(name);
        self
    }

    pub fn with_taxonomic_id(mut self, id: i64) -> Self {
        self.taxonomic_id = Some(id);
        self
    }
}

/// The three independently loaded datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Observations,
    ExpectedSpecies,
    RealSpecies,
}

impl Dataset {
    /// Load order used by the tracker
    pub const ALL: [Dataset; 3] = [
        Dataset::Observations,
        Dataset::ExpectedSpecies,
        Dataset::RealSpecies,
    ];

    /// Dataset name, which is also the name of its table
    pub fn name(self) -> &'static str {
        match self {
            Dataset::Observations => "observations",
            Dataset::ExpectedSpecies => "expected_species",
            Dataset::RealSpecies => "real_species",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Persisted load state of one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadStatus {
    pub dataset: String,
    pub is_loaded: bool,
    pub loaded_at: Option<DateTime<Utc>>,
}
