//! Integration tests for loading the three datasets from CSV files
//!
//! Covers:
//! - Idempotent loading: a second run without force inserts nothing
//! - Forced reload of one dataset leaves the others untouched
//! - A conflicting observation aborts the load and leaves the dataset unmarked

use cbc_common::config::Config;
use cbc_common::db::init::init_database;
use cbc_common::db::Dataset;
use cbc_common::query::Observations;
use cbc_common::reference::{ReferenceList, ReferenceLists};
use cbc_common::report::ReportBuilder;
use cbc_common::source::CsvSources;
use cbc_common::store::FactStore;
use cbc_common::tracker::{LoadOutcome, LoadTracker};
use cbc_common::Error;
use sqlx::SqlitePool;
use tempfile::TempDir;

const RESULTS: &str = "\
Type,Name,Qualifier,Value
Weather,Temperature,Min,18
Weather,Temperature,Max,27.5
Weather,Wind Direction,,NW
Weather,\"Cloud Cover\",AM,Partly Clear
Effort,Hours,Foot,2
Effort,Hours,Vehicle,3
Effort,Hours,Feeder Watching,1
Species,Count,American Robin,5
Species,Count,Snow Bunting,3 CWP
Species,Count,Gull sp.,1
";

const EXPECTED: &str = "\
commonName,scientificName
American Robin,Turdus migratorius
Snow Bunting,Plectrophenax nivalis
Gull sp.,
";

const REAL: &str = "\
id,common_name,species
7610,American Robin,Turdus migratorius
5340,Snow Bunting,Plectrophenax nivalis
";

struct Fixture {
    _dir: TempDir,
    config: Config,
    pool: SqlitePool,
}

async fn fixture(results: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let config = Config {
        data_folder: dir.path().to_path_buf(),
        ..Config::default()
    };
    std::fs::write(config.results_path(), results).unwrap();
    std::fs::write(config.expected_species_path(), EXPECTED).unwrap();
    std::fs::write(config.real_species_path(), REAL).unwrap();

    let pool = init_database(&config.database_path()).await.unwrap();
    Fixture {
        _dir: dir,
        config,
        pool,
    }
}

async fn row_counts(pool: &SqlitePool) -> (i64, i64, i64) {
    let store = FactStore::new(pool.clone());
    let lists = ReferenceLists::new(pool.clone());
    (
        store.count().await.unwrap(),
        lists.count(ReferenceList::Expected).await.unwrap(),
        lists.count(ReferenceList::Real).await.unwrap(),
    )
}

#[tokio::test]
async fn test_second_load_is_a_no_op() {
    let fx = fixture(RESULTS).await;
    let sources = CsvSources::from_config(&fx.config);
    let tracker = LoadTracker::new(fx.pool.clone());

    let first = tracker.load_all(false, &sources).await.unwrap();
    assert_eq!(first.outcome(Dataset::Observations), Some(LoadOutcome::Loaded { rows: 10 }));
    assert_eq!(first.outcome(Dataset::ExpectedSpecies), Some(LoadOutcome::Loaded { rows: 3 }));
    assert_eq!(first.outcome(Dataset::RealSpecies), Some(LoadOutcome::Loaded { rows: 2 }));
    let before = row_counts(&fx.pool).await;
    let content_before = FactStore::new(fx.pool.clone()).query("weather").await.unwrap();

    let second = tracker.load_all(false, &sources).await.unwrap();
    assert_eq!(second.rows_inserted(), 0);
    assert_eq!(row_counts(&fx.pool).await, before);
    assert_eq!(
        FactStore::new(fx.pool.clone()).query("weather").await.unwrap(),
        content_before
    );
}

#[tokio::test]
async fn test_force_reload_of_one_dataset() {
    let fx = fixture(RESULTS).await;
    let sources = CsvSources::from_config(&fx.config);
    let tracker = LoadTracker::new(fx.pool.clone());
    tracker.load_all(false, &sources).await.unwrap();
    let first_loaded_at = tracker
        .status(Dataset::RealSpecies)
        .await
        .unwrap()
        .unwrap()
        .loaded_at;

    // Edit the expected list and reload only that dataset
    std::fs::write(
        fx.config.expected_species_path(),
        "commonName,scientificName\nAmerican Robin,Turdus migratorius\n",
    )
    .unwrap();
    let outcome = tracker
        .load_dataset(Dataset::ExpectedSpecies, true, &sources)
        .await
        .unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { rows: 1 });

    assert_eq!(row_counts(&fx.pool).await, (10, 1, 2));
    let status = tracker.status(Dataset::RealSpecies).await.unwrap().unwrap();
    assert_eq!(status.loaded_at, first_loaded_at);
}

#[tokio::test]
async fn test_force_reload_replaces_observations() {
    let fx = fixture(RESULTS).await;
    let sources = CsvSources::from_config(&fx.config);
    let tracker = LoadTracker::new(fx.pool.clone());
    tracker.load_all(false, &sources).await.unwrap();

    std::fs::write(fx.config.results_path(), "weather,temperature,min,-4\n").unwrap();
    let report = tracker.load_all(true, &sources).await.unwrap();
    assert_eq!(report.outcome(Dataset::Observations), Some(LoadOutcome::Loaded { rows: 1 }));

    let obs = Observations::new(fx.pool.clone());
    assert_eq!(
        obs.get_qualified_value("weather", "temperature", "min").await.unwrap(),
        Some("-4".to_string())
    );
    assert!(obs.list_by_kind("species").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_conflicting_observation_aborts_load() {
    let fx = fixture("weather,temperature,min,18\nWeather,Temperature,MIN,19\n").await;
    let sources = CsvSources::from_config(&fx.config);
    let tracker = LoadTracker::new(fx.pool.clone());

    let err = tracker.load_all(false, &sources).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateFact { .. }));
    assert!(!tracker.is_loaded(Dataset::Observations).await.unwrap());
    assert_eq!(FactStore::new(fx.pool.clone()).count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_source_file_is_io_error() {
    let fx = fixture(RESULTS).await;
    std::fs::remove_file(fx.config.real_species_path()).unwrap();
    let sources = CsvSources::from_config(&fx.config);
    let tracker = LoadTracker::new(fx.pool.clone());

    let err = tracker.load_all(false, &sources).await.unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    // Datasets before the failing one stay loaded
    assert!(tracker.is_loaded(Dataset::Observations).await.unwrap());
    assert!(tracker.is_loaded(Dataset::ExpectedSpecies).await.unwrap());
    assert!(!tracker.is_loaded(Dataset::RealSpecies).await.unwrap());
}

#[tokio::test]
async fn test_loaded_data_feeds_reports() {
    let fx = fixture(RESULTS).await;
    let sources = CsvSources::from_config(&fx.config);
    LoadTracker::new(fx.pool.clone())
        .load_all(false, &sources)
        .await
        .unwrap();

    let obs = Observations::new(fx.pool.clone());
    let refs = ReferenceLists::new(fx.pool.clone()).snapshot().await.unwrap();
    let report = ReportBuilder::new(&obs, &refs, &fx.config)
        .audubon()
        .await
        .unwrap();

    assert_eq!(report.weather.temperature_max, Some(28));
    assert_eq!(report.weather.cloud_cover_am.as_str(), "partly clear");
    assert_eq!(report.species.species.len(), 3);
    // Robin counts; bunting is count-week; gull sp. is not a real species
    assert_eq!(report.species.total_species, 1);
}
