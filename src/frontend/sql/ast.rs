use std::fmt;

use crate::types::Column;

/// One parsed command. Literal values stay as written; they are typed
/// against the table schema when the statement runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    ShowTables,
    ShowColumns {
        table: String,
    },
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    DropTable {
        name: String,
    },
    TruncateTable {
        name: String,
    },
    Insert {
        table: String,
        values: Vec<String>,
    },
    Select {
        table: String,
        /// `None` for `*`.
        columns: Option<Vec<String>>,
        predicate: Option<Predicate>,
    },
    Update {
        table: String,
        assignment: Assignment,
        predicate: Predicate,
    },
    Delete {
        table: String,
        predicate: Predicate,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Gt,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
        };
        write!(f, "{s}")
    }
}
