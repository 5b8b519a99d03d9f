//! Integration tests for configuration resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate CBC_CONFIG, CBC_DATA_FOLDER or RESULTS_CSV_FILE are
//! marked with #[serial] so they run sequentially, not in parallel.

use cbc_common::config::{
    resolve_data_folder, Config, CONFIG_ENV_VAR, DATA_FOLDER_ENV_VAR, RESULTS_FILE_ENV_VAR,
};
use cbc_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(CONFIG_ENV_VAR);
    env::remove_var(DATA_FOLDER_ENV_VAR);
    env::remove_var(RESULTS_FILE_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_data_folder_wins() {
    clear_env();
    env::set_var(DATA_FOLDER_ENV_VAR, "/tmp/cbc-env-folder");

    let folder = resolve_data_folder(
        Some(Path::new("/tmp/cbc-cli-folder")),
        Some(Path::new("/tmp/cbc-toml-folder")),
    );
    assert_eq!(folder, PathBuf::from("/tmp/cbc-cli-folder"));

    clear_env();
}

#[test]
#[serial]
fn test_env_data_folder_over_config_value() {
    clear_env();
    env::set_var(DATA_FOLDER_ENV_VAR, "/tmp/cbc-env-folder");

    let folder = resolve_data_folder(None, Some(Path::new("/tmp/cbc-toml-folder")));
    assert_eq!(folder, PathBuf::from("/tmp/cbc-env-folder"));

    clear_env();
}

#[test]
#[serial]
fn test_config_value_then_default() {
    clear_env();

    let folder = resolve_data_folder(None, Some(Path::new("/tmp/cbc-toml-folder")));
    assert_eq!(folder, PathBuf::from("/tmp/cbc-toml-folder"));

    let default = resolve_data_folder(None, None);
    assert!(!default.as_os_str().is_empty());
}

#[test]
#[serial]
fn test_load_from_explicit_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "data_folder = {:?}\nresults_file = \"results-2024.csv\"\ncount_week_suffix = \"CW\"\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    let config = Config::load(Some(&config_path), None).unwrap();
    assert_eq!(config.data_folder, dir.path());
    assert_eq!(config.results_path(), dir.path().join("results-2024.csv"));
    assert_eq!(config.count_week_suffix, "cw");
    assert_eq!(config.database_file, "cbc_database.db");
}

#[test]
#[serial]
fn test_config_file_from_env_and_results_override() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("cbc.toml");
    std::fs::write(&config_path, "log_level = \"debug\"\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &config_path);
    env::set_var(RESULTS_FILE_ENV_VAR, "override.csv");

    let config = Config::load(None, Some(dir.path())).unwrap();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.results_file, "override.csv");
    assert_eq!(config.data_folder, dir.path());

    clear_env();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env();
    let result = Config::load(Some(Path::new("/nonexistent/cbc/config.toml")), None);
    assert!(matches!(result, Err(Error::Config(_))));
}
