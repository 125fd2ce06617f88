//! Database configuration, loadable from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};
use crate::storage::btree::MIN_ORDER;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Directory holding table and index documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Maximum keys per index node before it splits.
    #[serde(default = "default_index_order")]
    pub index_order: usize,

    /// REPL history file; history is not persisted when unset.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_index_order() -> usize {
    4
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            index_order: default_index_order(),
            history_file: None,
        }
    }
}

impl DbConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_index_order(mut self, order: usize) -> Self {
        self.index_order = order;
        self
    }

    pub fn from_file(path: &Path) -> DbResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DbError::io(path, e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.index_order < MIN_ORDER {
            return Err(DbError::Config(format!(
                "index_order must be at least {MIN_ORDER}, got {}",
                self.index_order
            )));
        }
        Ok(())
    }
}
