use std::path::PathBuf;

use thiserror::Error;

use crate::frontend::sql::errors::ParseError;
use crate::types::DataType;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Table '{0}' not found.")]
    TableNotFound(String),

    #[error("Table '{0}' already exists.")]
    TableExists(String),

    #[error("Table name '{0}' is reserved: names ending in '_index' belong to index documents.")]
    ReservedName(String),

    #[error("Table '{table}' would share index document '{file}' with table '{other}'.")]
    IndexNameClash {
        table: String,
        other: String,
        file: String,
    },

    #[error("Value count ({values}) doesn't match column count ({columns}).")]
    SchemaMismatch { values: usize, columns: usize },

    #[error("Column '{column}' not found in table '{table}'.")]
    ColumnNotFound { table: String, column: String },

    #[error("Invalid {ty} value '{raw}' for column '{column}'.")]
    InvalidValue {
        column: String,
        ty: DataType,
        raw: String,
    },

    #[error("Corrupt document {}: {reason}", path.display())]
    CorruptDocument { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DbError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        DbError::CorruptDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
