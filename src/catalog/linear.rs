use std::collections::HashMap;

use crate::storage::row_store::TableDocument;
use crate::types::{Row, Schema, Value};

/// Per-column map from observed value to the positions of the rows holding
/// it. Equality only; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearIndex {
    columns: HashMap<String, HashMap<Value, Vec<usize>>>,
}

impl LinearIndex {
    pub fn build(doc: &TableDocument) -> Self {
        let mut index = Self {
            columns: doc
                .columns
                .columns
                .iter()
                .map(|c| (c.name.clone(), HashMap::new()))
                .collect(),
        };

        for (position, row) in doc.rows.iter().enumerate() {
            index.push_row(&doc.columns, position, row);
        }

        index
    }

    pub fn push_row(&mut self, columns: &Schema, position: usize, row: &Row) {
        for (column, value) in columns.columns.iter().zip(row) {
            self.columns
                .entry(column.name.clone())
                .or_default()
                .entry(value.clone())
                .or_default()
                .push(position);
        }
    }

    /// Positions of rows whose `column` equals `value`; `None` when the
    /// column is not tracked.
    pub fn positions(&self, column: &str, value: &Value) -> Option<&[usize]> {
        self.columns
            .get(column)
            .map(|values| values.get(value).map_or(&[][..], Vec::as_slice))
    }

    #[cfg(test)]
    fn column(&self, column: &str) -> Option<&HashMap<Value, Vec<usize>>> {
        self.columns.get(column)
    }
}
