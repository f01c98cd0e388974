//! Configuration file for a data-entry installation
//!
//! ```json
//! {
//!   "data_dir": "/srv/abq",
//!   "csv_prefix": "abq_data_record",
//!   "csv_enabled": true,
//!   "database_file": "abq.sqlite3",
//!   "database_enabled": false
//! }
//! ```
//!
//! Only `data_dir` is required. The file is validated once, at load.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::clock::Clock;
use crate::store::{CsvFileSink, SqliteSink, Store, StoreResult, DEFAULT_PREFIX};

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        "ABQ_CONFIG_ERROR"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding CSV files, the database, and settings (required)
    pub data_dir: String,

    #[serde(default = "default_csv_prefix")]
    pub csv_prefix: String,

    #[serde(default = "default_true")]
    pub csv_enabled: bool,

    /// Database file name, relative to `data_dir`
    #[serde(default = "default_database_file")]
    pub database_file: String,

    #[serde(default)]
    pub database_enabled: bool,
}

fn default_csv_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

fn default_database_file() -> String {
    "abq.sqlite3".to_string()
}

impl Config {
    /// Config with every optional key at its default
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            csv_prefix: default_csv_prefix(),
            csv_enabled: true,
            database_file: default_database_file(),
            database_enabled: false,
        }
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }

        if !self.csv_enabled && !self.database_enabled {
            return Err(ConfigError::Invalid(
                "at least one of csv_enabled or database_enabled must be true".into(),
            ));
        }

        if self.csv_prefix.is_empty() {
            return Err(ConfigError::Invalid("csv_prefix must not be empty".into()));
        }
        if self.csv_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "csv_prefix '{}' must not contain path separators",
                self.csv_prefix
            )));
        }

        if self.database_file.trim().is_empty() {
            return Err(ConfigError::Invalid("database_file must not be empty".into()));
        }

        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_path().join(&self.database_file)
    }

    /// File sink over `data_dir`, dated by `clock`
    pub fn csv_sink(&self, clock: impl Clock + 'static) -> CsvFileSink {
        CsvFileSink::new(self.data_path(), self.csv_prefix.clone()).with_clock(clock)
    }

    pub fn open_database(&self) -> StoreResult<SqliteSink> {
        SqliteSink::open(&self.database_path())
    }

    /// Builds the store for every enabled sink.
    ///
    /// The relational sink goes first: a constraint failure there must stop
    /// the record before it reaches the CSV file.
    pub fn build_store(&self, clock: impl Clock + 'static) -> StoreResult<Store> {
        let mut store = Store::new();
        if self.database_enabled {
            store.add_sink(self.open_database()?);
        }
        if self.csv_enabled {
            store.add_sink(self.csv_sink(clock));
        }
        Ok(store)
    }
}
