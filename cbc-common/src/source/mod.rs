//! Tabular sources for the three datasets
//!
//! Each source is a comma-separated file. A header row is optional: when the
//! first row names the columns (case-insensitive, `_`/space ignored, so
//! `commonName` and `common_name` are the same column) cells are mapped by
//! name, otherwise by position.

pub mod csv;

use crate::config::Config;
use crate::db::models::{RawRow, SpeciesEntry};
use crate::{Error, Result};
use self::csv::CsvRecord;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies the rows of each dataset to the load tracker
pub trait DatasetSource {
    fn observations(&self) -> Result<Vec<RawRow>>;
    fn expected_species(&self) -> Result<Vec<SpeciesEntry>>;
    fn real_species(&self) -> Result<Vec<SpeciesEntry>>;
}

/// The three CSV files named by the configuration
#[derive(Debug, Clone)]
pub struct CsvSources {
    pub observations: PathBuf,
    pub expected_species: PathBuf,
    pub real_species: PathBuf,
}

impl CsvSources {
    pub fn from_config(config: &Config) -> Self {
        Self {
            observations: config.results_path(),
            expected_species: config.expected_species_path(),
            real_species: config.real_species_path(),
        }
    }
}

impl DatasetSource for CsvSources {
    fn observations(&self) -> Result<Vec<RawRow>> {
        read_observations(&self.observations)
    }

    fn expected_species(&self) -> Result<Vec<SpeciesEntry>> {
        read_expected_species(&self.expected_species)
    }

    fn real_species(&self) -> Result<Vec<SpeciesEntry>> {
        read_real_species(&self.real_species)
    }
}

pub fn read_observations(path: &Path) -> Result<Vec<RawRow>> {
    parse_observations(path, &std::fs::read_to_string(path)?)
}

pub fn read_expected_species(path: &Path) -> Result<Vec<SpeciesEntry>> {
    parse_expected_species(path, &std::fs::read_to_string(path)?)
}

pub fn read_real_species(path: &Path) -> Result<Vec<SpeciesEntry>> {
    parse_real_species(path, &std::fs::read_to_string(path)?)
}

/// Header key: lower case with `_` and spaces removed
fn header_key(cell: &str) -> String {
    cell.trim()
        .chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Column positions resolved from a header row
struct HeaderMap {
    keys: Vec<String>,
}

impl HeaderMap {
    fn new(record: &CsvRecord) -> Self {
        Self {
            keys: record.cells.iter().map(|c| header_key(c)).collect(),
        }
    }

    fn find(&self, aliases: &[&str]) -> Option<usize> {
        self.keys.iter().position(|k| aliases.contains(&k.as_str()))
    }
}

fn source_error(path: &Path, line: usize, message: impl Into<String>) -> Error {
    Error::Source {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

/// Cell at `index`, or empty when the row is short
fn cell(record: &CsvRecord, index: Option<usize>) -> &str {
    index
        .and_then(|i| record.cells.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

const TYPE_ALIASES: &[&str] = &["type", "kind", "resulttype"];
const NAME_ALIASES: &[&str] = &["name", "resultname"];
const QUALIFIER_ALIASES: &[&str] = &["qualifier"];
const VALUE_ALIASES: &[&str] = &["value", "val", "resultvalue"];

/// Observation rows: `type, name, qualifier, value` (qualifier may be omitted)
pub fn parse_observations(path: &Path, text: &str) -> Result<Vec<RawRow>> {
    let mut records = csv::parse_records(text, ',').into_iter().peekable();

    let mut columns = None;
    if let Some(first) = records.peek() {
        let header = HeaderMap::new(first);
        if let (Some(kind), Some(name), Some(value)) = (
            header.find(TYPE_ALIASES),
            header.find(NAME_ALIASES),
            header.find(VALUE_ALIASES),
        ) {
            columns = Some((kind, name, header.find(QUALIFIER_ALIASES), value));
            records.next();
        }
    }

    let mut rows = Vec::new();
    for record in records.filter(|r| !r.is_blank()) {
        let (kind, name, qualifier, value) = match columns {
            Some(mapped) => mapped,
            None => match record.cells.len() {
                n if n >= 4 => (0, 1, Some(2), 3),
                3 => (0, 1, None, 2),
                n => {
                    return Err(source_error(
                        path,
                        record.line,
                        format!("expected type, name, qualifier, value; found {} cells", n),
                    ))
                }
            },
        };

        let row = RawRow::new(
            cell(&record, Some(kind)),
            cell(&record, Some(name)),
            cell(&record, qualifier),
            cell(&record, Some(value)),
        );
        if row.kind.trim().is_empty() || row.name.trim().is_empty() {
            return Err(source_error(path, record.line, "type and name are required"));
        }
        rows.push(row);
    }

    debug!("Read {} observation rows from {}", rows.len(), path.display());
    Ok(rows)
}

const ID_ALIASES: &[&str] = &["id", "aouid", "taxonomicid"];
const COMMON_NAME_ALIASES: &[&str] = &["commonname"];
const SCIENTIFIC_NAME_ALIASES: &[&str] = &["scientificname", "species"];

/// Expected species rows: `commonName, scientificName`
pub fn parse_expected_species(path: &Path, text: &str) -> Result<Vec<SpeciesEntry>> {
    parse_species(path, text, false)
}

/// Real species rows: `id, commonName, scientificName`
pub fn parse_real_species(path: &Path, text: &str) -> Result<Vec<SpeciesEntry>> {
    parse_species(path, text, true)
}

fn parse_species(path: &Path, text: &str, with_id: bool) -> Result<Vec<SpeciesEntry>> {
    let mut records = csv::parse_records(text, ',').into_iter().peekable();

    // Positional layout unless the first row names the common name column
    let mut columns = if with_id {
        (Some(0), 1, Some(2))
    } else {
        (None, 0, Some(1))
    };
    if let Some(first) = records.peek() {
        let header = HeaderMap::new(first);
        if let Some(common) = header.find(COMMON_NAME_ALIASES) {
            let id = if with_id { header.find(ID_ALIASES) } else { None };
            columns = (id, common, header.find(SCIENTIFIC_NAME_ALIASES));
            records.next();
        }
    }
    let (id, common, scientific) = columns;

    let mut entries = Vec::new();
    for record in records.filter(|r| !r.is_blank()) {
        let common_name = cell(&record, Some(common));
        if common_name.trim().is_empty() {
            return Err(source_error(path, record.line, "common name is required"));
        }

        let mut entry =
            SpeciesEntry::new(common_name).with_scientific_name(cell(&record, scientific));
        let raw_id = cell(&record, id).trim();
        if !raw_id.is_empty() {
            let taxonomic_id = raw_id.parse::<i64>().map_err(|_| {
                source_error(path, record.line, format!("species id '{}' is not an integer", raw_id))
            })?;
            entry = entry.with_taxonomic_id(taxonomic_id);
        }
        entries.push(entry);
    }

    debug!("Read {} species from {}", entries.len(), path.display());
    Ok(entries)
}
