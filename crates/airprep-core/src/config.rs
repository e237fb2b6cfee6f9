use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_STORE_ROOT: &str = "./data";
pub const DEFAULT_CONTAINER: &str = "airprep";
pub const DEFAULT_SOURCE_PREFIX: &str = "DataPreprocessing/src/data_store_pkl_files/csv";
pub const DEFAULT_STACKED_KEY: &str = "DataPreprocessing/src/data_store_pkl_files/air_pollution.zip";
pub const DEFAULT_CLEAN_OUTPUT_KEY: &str =
    "DataPreprocessing/src/data_store_pkl_files/air_pollution_cleaned.zip";
pub const DEFAULT_COLUMNS_TO_DROP: [&str; 5] = ["co", "no", "no2", "o3", "so2"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("config value '{0}' must not be empty")]
    Empty(&'static str),
}

/// Store location and object keys used by the pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub store_root: PathBuf,
    pub container: String,
    pub source_prefix: String,
    pub stacked_key: String,
    pub clean_input_key: String,
    pub clean_output_key: String,
    pub columns_to_drop: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from(DEFAULT_STORE_ROOT),
            container: DEFAULT_CONTAINER.to_string(),
            source_prefix: DEFAULT_SOURCE_PREFIX.to_string(),
            stacked_key: DEFAULT_STACKED_KEY.to_string(),
            clean_input_key: DEFAULT_STACKED_KEY.to_string(),
            clean_output_key: DEFAULT_CLEAN_OUTPUT_KEY.to_string(),
            columns_to_drop: DEFAULT_COLUMNS_TO_DROP
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    /// Defaults, then the optional TOML file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Overrides fields from environment variables. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |names: &[&str]| {
            names
                .iter()
                .filter_map(|&name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        if let Some(root) = var(&["AIRPREP_STORE_ROOT"]) {
            self.store_root = PathBuf::from(root);
        }
        if let Some(container) = var(&["AIRPREP_CONTAINER", "DATA_BUCKET_NAME"]) {
            self.container = container;
        }
        if let Some(prefix) = var(&["AIRPREP_SOURCE_PREFIX"]) {
            self.source_prefix = prefix;
        }
        if let Some(key) = var(&["AIRPREP_STACKED_KEY"]) {
            self.stacked_key = key;
        }
        if let Some(key) = var(&["AIRPREP_CLEAN_INPUT_KEY", "TEST_DATA_RM_COL_INPUT"]) {
            self.clean_input_key = key;
        }
        if let Some(key) = var(&["AIRPREP_CLEAN_OUTPUT_KEY", "TEST_DATA_RM_COL_OUTPUT"]) {
            self.clean_output_key = key;
        }
        if let Some(columns) = var(&["AIRPREP_COLUMNS_TO_DROP"]) {
            self.columns_to_drop = split_list(&columns);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container.trim().is_empty() {
            return Err(ConfigError::Empty("container"));
        }
        if self.stacked_key.trim().is_empty() {
            return Err(ConfigError::Empty("stacked_key"));
        }
        if self.clean_input_key.trim().is_empty() {
            return Err(ConfigError::Empty("clean_input_key"));
        }
        if self.clean_output_key.trim().is_empty() {
            return Err(ConfigError::Empty("clean_output_key"));
        }
        Ok(())
    }
}

/// Splits a comma separated list, trimming entries and skipping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
