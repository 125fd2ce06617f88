use std::fmt;

use thiserror::Error;

/// 1-based column of a token within the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub column: usize,
}

impl Position {
    pub(crate) fn at(offset: usize) -> Self {
        Self { column: offset + 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}", self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error at {position}: expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("syntax error at {position}: unexpected character '{ch}'")]
    UnexpectedChar { ch: char, position: Position },

    #[error("syntax error at {position}: unterminated string literal")]
    UnterminatedString { position: Position },

    #[error("Invalid column definition: {definition}")]
    MalformedDefinition { definition: String },

    #[error("Unknown type '{ty}' for column '{column}'.")]
    UnknownType { column: String, ty: String },

    #[error("Duplicate column '{0}'.")]
    DuplicateColumn(String),

    #[error("Unknown or unsupported command.")]
    Unsupported,
}
