//! Engine configuration
//!
//! The built-in unit tables are always loaded. Extra tables (regional
//! units, new seed packagings) come from a JSON file:
//!
//! ```json
//! {"tables": [{"group": "seed", "units": [
//!     {"key": "box", "name": "box", "value": 50000, "aliases": ["boxes"], "selectable_as": "boxes"}
//! ]}]}
//! ```
//!
//! The file path is read from `AGRI_UNIT_TABLES` by `EngineConfig::from_env`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use agri_core::AgriError;
use agri_units::{DefinitionTable, UnitError, UnitRegistry};

/// Environment variable naming an extra unit tables file
pub const UNIT_TABLES_ENV: &str = "AGRI_UNIT_TABLES";

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid unit tables: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Units(#[from] UnitError),
}

impl From<EngineError> for AgriError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Units(e) => e.into(),
            EngineError::Io { path, source } => {
                AgriError::config_error(format!("cannot read {}", path.display()))
                    .with_note(source.to_string())
            }
            other => AgriError::config_error(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Registered after the built-in tables, in order
    #[serde(default)]
    pub tables: Vec<DefinitionTable>,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let json = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Configuration named by `AGRI_UNIT_TABLES`, or the default when unset
    pub fn from_env() -> Result<Self, EngineError> {
        match env::var_os(UNIT_TABLES_ENV) {
            Some(path) => {
                debug!(path = ?path, "loading unit tables");
                Self::from_path(Path::new(&path))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn with_table(mut self, table: DefinitionTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Built-in tables followed by the configured ones
    pub fn build_units(&self) -> Result<UnitRegistry, EngineError> {
        let mut builder = UnitRegistry::builder();
        for table in agri_units::definitions::standard_tables().iter().chain(&self.tables) {
            builder = builder.register_table(table)?;
        }
        Ok(builder.build())
    }
}
