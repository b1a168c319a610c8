//! TOML configuration for `salary-calc`.
//!
//! Read from `--config`, else `salary.toml` in the working directory.
//! Every key is optional; command-line flags override the file.
//!
//! ```toml
//! law = "new"
//! region = 1
//! as_of = "2026-01-01"
//! log_level = "info"
//! log_file = "salary-calc.log"
//! wage_table = "tables/wage_table.csv"
//! brackets = "tables/pit_brackets.csv"
//!
//! [solver]
//! tolerance = 1000
//! max_iterations = 50
//! max_gross = 100000000000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tax_core::calculations::SolverSettings;
use tax_core::{LawVersion, RegionType};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "salary.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub law: Option<LawVersion>,
    pub region: Option<RegionType>,
    pub as_of: Option<NaiveDate>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub wage_table: Option<PathBuf>,
    pub brackets: Option<PathBuf>,
    pub solver: SolverSettings,
}

impl AppConfig {
    pub fn from_toml_str(
        content: &str,
        path: &str,
    ) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&content, &path_str)?;
        debug!(path = %path_str, "loaded config");
        Ok(config)
    }

    /// Loads `explicit` when given, else `salary.toml` in the working
    /// directory when present, else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(Path::new(DEFAULT_CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }
}
