//! Configuration loading and data folder resolution
//!
//! Config file priority:
//! 1. Command-line argument
//! 2. `CBC_CONFIG` environment variable
//! 3. `<config dir>/cbc-results/config.toml`
//! 4. Compiled defaults
//!
//! Data folder priority: command-line argument, `CBC_DATA_FOLDER`, the
//! `data_folder` TOML key, then an OS-dependent default.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_ENV_VAR: &str = "CBC_CONFIG";
pub const DATA_FOLDER_ENV_VAR: &str = "CBC_DATA_FOLDER";
/// Overrides the observations file name
pub const RESULTS_FILE_ENV_VAR: &str = "RESULTS_CSV_FILE";

const APP_DIR: &str = "cbc-results";

/// Keys accepted in `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub data_folder: Option<PathBuf>,
    pub database_file: Option<String>,
    pub results_file: Option<String>,
    pub expected_species_file: Option<String>,
    pub real_species_file: Option<String>,
    pub count_week_suffix: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_folder: PathBuf,
    pub database_file: String,
    pub results_file: String,
    pub expected_species_file: String,
    pub real_species_file: String,
    /// Count values ending in this marker are count-week entries
    pub count_week_suffix: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_folder: default_data_folder(),
            database_file: "cbc_database.db".to_string(),
            results_file: "cbc-results.csv".to_string(),
            expected_species_file: "mn-cbc-species.csv".to_string(),
            real_species_file: "NACC_list_species.csv".to_string(),
            count_week_suffix: "cwp".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Resolve configuration from CLI overrides, environment, TOML file and defaults
    pub fn load(cli_config: Option<&Path>, cli_data_folder: Option<&Path>) -> Result<Self> {
        let toml_config = match config_file_path(cli_config)? {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                parse_toml(&std::fs::read_to_string(&path)?)?
            }
            None => {
                info!("No configuration file found, using defaults");
                TomlConfig::default()
            }
        };

        let mut config = Self::from_toml(toml_config);
        config.data_folder = resolve_data_folder(cli_data_folder, Some(&config.data_folder));
        if let Ok(results_file) = std::env::var(RESULTS_FILE_ENV_VAR) {
            config.results_file = results_file;
        }

        Ok(config)
    }

    /// Apply TOML values over compiled defaults
    pub fn from_toml(toml_config: TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            data_folder: toml_config.data_folder.unwrap_or(defaults.data_folder),
            database_file: toml_config.database_file.unwrap_or(defaults.database_file),
            results_file: toml_config.results_file.unwrap_or(defaults.results_file),
            expected_species_file: toml_config
                .expected_species_file
                .unwrap_or(defaults.expected_species_file),
            real_species_file: toml_config
                .real_species_file
                .unwrap_or(defaults.real_species_file),
            count_week_suffix: toml_config
                .count_week_suffix
                .map(|s| s.trim().to_lowercase())
                .unwrap_or(defaults.count_week_suffix),
            log_level: toml_config.log_level.unwrap_or(defaults.log_level),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.in_data_folder(&self.database_file)
    }

    pub fn results_path(&self) -> PathBuf {
        self.in_data_folder(&self.results_file)
    }

    pub fn expected_species_path(&self) -> PathBuf {
        self.in_data_folder(&self.expected_species_file)
    }

    pub fn real_species_path(&self) -> PathBuf {
        self.in_data_folder(&self.real_species_file)
    }

    /// Relative names resolve against the data folder
    fn in_data_folder(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_folder.join(path)
        }
    }
}

pub fn parse_toml(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
}

/// Locate the config file; an explicitly named file must exist
fn config_file_path(cli_config: Option<&Path>) -> Result<Option<PathBuf>> {
    let explicit = cli_config
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    Ok(dirs::config_dir()
        .map(|d| d.join(APP_DIR).join("config.toml"))
        .filter(|path| path.exists()))
}

/// Data folder: CLI argument, then environment variable, then config value, then OS default
pub fn resolve_data_folder(cli_arg: Option<&Path>, config_value: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = std::env::var_os(DATA_FOLDER_ENV_VAR) {
        return PathBuf::from(path);
    }

    config_value
        .map(Path::to_path_buf)
        .unwrap_or_else(default_data_folder)
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./cbc_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_files_resolve_against_data_folder() {
        let config = Config {
            data_folder: PathBuf::from("/srv/cbc"),
            ..Config::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("/srv/cbc/cbc_database.db"));
        assert_eq!(config.results_path(), PathBuf::from("/srv/cbc/cbc-results.csv"));
    }

    #[test]
    fn test_absolute_file_kept() {
        let config = Config {
            real_species_file: "/opt/lists/nacc.csv".to_string(),
            ..Config::default()
        };
        assert_eq!(config.real_species_path(), PathBuf::from("/opt/lists/nacc.csv"));
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let toml_config = parse_toml(
            r#"
            database_file = "count.db"
            count_week_suffix = " CW "
            "#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config);
        assert_eq!(config.database_file, "count.db");
        assert_eq!(config.count_week_suffix, "cw");
        assert_eq!(config.results_file, "cbc-results.csv");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(parse_toml("database_file = ["), Err(Error::Config(_))));
    }
}
