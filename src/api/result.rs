use std::fmt;

use crate::types::{Row, Schema, Value};

/// Outcome of one statement, rendered for the interactive surface through
/// `Display`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Created { table: String, columns: Schema },
    Dropped(String),
    Truncated(String),
    Inserted { table: String, row: Row },
    Rows(Vec<Row>),
    Updated { table: String, count: usize },
    Deleted { table: String, count: usize },
    Tables(Vec<String>),
    Columns(Schema),
}

impl QueryResult {
    /// Rows of a SELECT; `None` for every other statement.
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

struct RowDisplay<'a>(&'a [Value]);

impl fmt::Display for RowDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Value::Int64(n) => write!(f, "{n}")?,
                Value::String(s) => write!(f, "'{s}'")?,
            }
        }
        write!(f, "]")
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Created { table, columns } => {
                let defs: Vec<_> = columns
                    .columns
                    .iter()
                    .map(|c| format!("{} {}", c.name, c.ty))
                    .collect();
                write!(f, "Created table '{table}' with columns ({}).", defs.join(", "))
            }
            QueryResult::Dropped(table) => write!(f, "Dropped table '{table}' and its indexes."),
            QueryResult::Truncated(table) => {
                write!(f, "Truncated table '{table}' (all rows deleted, schema kept).")
            }
            QueryResult::Inserted { table, row } => {
                write!(f, "Inserted {} into '{table}'.", RowDisplay(row))
            }
            QueryResult::Rows(rows) => {
                for row in rows {
                    writeln!(f, "{}", RowDisplay(row))?;
                }
                match rows.len() {
                    1 => write!(f, "(1 row)"),
                    n => write!(f, "({n} rows)"),
                }
            }
            QueryResult::Updated { table, count } => write!(f, "Updated {count} rows in '{table}'."),
            QueryResult::Deleted { table, count } => {
                write!(f, "Deleted {count} rows from '{table}'.")
            }
            QueryResult::Tables(tables) => {
                write!(f, "Tables:")?;
                for table in tables {
                    write!(f, "\n  - {table}")?;
                }
                Ok(())
            }
            QueryResult::Columns(schema) => {
                write!(f, "Columns:")?;
                for column in &schema.columns {
                    write!(f, "\n  - {} ({})", column.name, column.ty)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, DataType};

    #[test]
    fn renders_rows_with_quoted_text() {
        let result = QueryResult::Rows(vec![
            vec![Value::Int64(3), Value::from("c")],
            vec![Value::Int64(4), Value::from("d")],
        ]);

        assert_eq!(result.to_string(), "[3, 'c']\n[4, 'd']\n(2 rows)");
        assert_eq!(QueryResult::Rows(vec![]).to_string(), "(0 rows)");
    }

    #[test]
    fn renders_listings() {
        let schema = Schema::new(vec![
            Column::new("id", DataType::Int),
            Column::new("name", DataType::Text),
        ]);

        assert_eq!(
            QueryResult::Columns(schema.clone()).to_string(),
            "Columns:\n  - id (INT)\n  - name (TEXT)"
        );
        assert_eq!(
            QueryResult::Tables(vec!["a".into(), "b".into()]).to_string(),
            "Tables:\n  - a\n  - b"
        );
        assert_eq!(
            QueryResult::Created {
                table: "t".into(),
                columns: schema,
            }
            .to_string(),
            "Created table 't' with columns (id INT, name TEXT)."
        );
    }
}
