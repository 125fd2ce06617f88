use std::ops::Bound;

use tracing::{debug, info};

use crate::api::result::QueryResult;
use crate::catalog::{IndexCatalog, RowIndex};
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::frontend::sql::{
    ast::{Assignment, CompareOp, Predicate, Statement},
    parse,
};
use crate::storage::index_file_name;
use crate::storage::row_store::RowStore;
use crate::types::{Column, Row, Schema, Value};

/// Entry point for every table operation.
///
/// Reads and writes go to the row store. Inserts also feed the tree index on
/// the first declared column, and lookups are routed to that tree when one
/// exists:
///
/// | predicate            | tree on column | served by                       |
/// |----------------------|----------------|---------------------------------|
/// | `c = v`              | yes            | `search` (at most one row)      |
/// | `c > v` / `c < v`    | yes            | `range` with an unbounded side  |
/// | `c = v`              | no             | linear map, else full scan      |
/// | anything else        | -              | full scan                       |
///
/// UPDATE and DELETE always scan and never touch the tree, so tree lookups
/// can return rows that were since changed or removed.
pub struct Database {
    config: DbConfig,
    store: RowStore,
    indexes: IndexCatalog,
}

impl Database {
    pub fn open(config: DbConfig) -> DbResult<Self> {
        config.validate()?;

        let store = RowStore::open(&config.data_dir)?;
        let indexes = IndexCatalog::new(&config.data_dir, config.index_order);

        info!(
            data_dir = %config.data_dir.display(),
            index_order = config.index_order,
            "database opened"
        );

        Ok(Self {
            config,
            store,
            indexes,
        })
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn indexes_mut(&mut self) -> &mut IndexCatalog {
        &mut self.indexes
    }

    pub fn query(&mut self, sql: &str) -> DbResult<QueryResult> {
        let stmt = parse(sql)?;
        self.execute(stmt)
    }

    pub fn execute(&mut self, stmt: Statement) -> DbResult<QueryResult> {
        match stmt {
            Statement::CreateTable { name, columns } => {
                let columns = self.create_table(&name, columns)?;
                Ok(QueryResult::Created {
                    table: name,
                    columns,
                })
            }
            Statement::DropTable { name } => {
                self.drop_table(&name)?;
                Ok(QueryResult::Dropped(name))
            }
            Statement::TruncateTable { name } => {
                self.truncate_table(&name)?;
                Ok(QueryResult::Truncated(name))
            }
            Statement::Insert { table, values } => {
                let row = self.insert(&table, &values)?;
                Ok(QueryResult::Inserted { table, row })
            }
            Statement::Select {
                table,
                columns,
                predicate,
            } => self
                .select(&table, columns.as_deref(), predicate.as_ref())
                .map(QueryResult::Rows),
            Statement::Update {
                table,
                assignment,
                predicate,
            } => {
                let count = self.update(&table, &assignment, &predicate)?;
                Ok(QueryResult::Updated { table, count })
            }
            Statement::Delete { table, predicate } => {
                let count = self.delete(&table, &predicate)?;
                Ok(QueryResult::Deleted { table, count })
            }
            Statement::ShowTables => self.show_tables().map(QueryResult::Tables),
            Statement::ShowColumns { table } => self.show_columns(&table).map(QueryResult::Columns),
        }
    }

    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> DbResult<Schema> {
        let schema = Schema::new(columns);
        if let Some(first) = schema.first() {
            self.check_index_name(name, &first.name)?;
        }

        let doc = self.store.create(name, schema)?;
        info!(table = name, columns = doc.columns.len(), "table created");
        Ok(doc.columns)
    }

    /// Fails when the first-column index document of `table` would have the
    /// same file name as that of an existing table, e.g. `a (b_c ...)` and
    /// `a_b (c ...)`.
    fn check_index_name(&self, table: &str, column: &str) -> DbResult<()> {
        let file = index_file_name(table, column);

        for other in self.store.list()? {
            if other == table {
                continue;
            }
            let doc = self.store.load(&other)?;
            if let Some(first) = doc.columns.first()
                && index_file_name(&other, &first.name) == file
            {
                return Err(DbError::IndexNameClash {
                    table: table.to_string(),
                    other,
                    file,
                });
            }
        }

        Ok(())
    }

    /// Removes the row document and every index document of the table.
    pub fn drop_table(&mut self, name: &str) -> DbResult<()> {
        let doc = self.store.load(name)?;
        self.store.remove(name)?;
        self.indexes.drop_table(name, &doc.columns)?;

        info!(table = name, "table dropped");
        Ok(())
    }

    /// Clears the rows and keeps the schema. Index documents are left as
    /// they are.
    pub fn truncate_table(&mut self, name: &str) -> DbResult<()> {
        let mut doc = self.store.load(name)?;
        let removed = doc.rows.len();

        doc.rows.clear();
        self.store.save(name, &doc)?;
        self.indexes.rebuild_linear(name, &doc);

        info!(table = name, removed, "table truncated");
        Ok(())
    }

    pub fn insert(&mut self, table: &str, raw: &[String]) -> DbResult<Row> {
        let mut doc = self.store.load(table)?;

        if raw.len() != doc.columns.len() {
            return Err(DbError::SchemaMismatch {
                values: raw.len(),
                columns: doc.columns.len(),
            });
        }

        let row = doc
            .columns
            .columns
            .iter()
            .zip(raw)
            .map(|(column, value)| coerce(column, value))
            .collect::<DbResult<Row>>()?;

        // a tree document that fails to load aborts before any write
        if let Some(first) = doc.columns.first() {
            self.indexes
                .get_or_create(table, &first.name, self.config.index_order)?;
        }

        doc.rows.push(row.clone());
        self.store.save(table, &doc)?;

        let position = doc.rows.len() - 1;
        self.indexes
            .extend_linear(table, &doc.columns, position, &row);

        if let (Some(first), Some(key)) = (doc.columns.first(), row.first()) {
            self.indexes
                .record_insert(table, &first.name, key.clone(), row.clone())?;
        }

        debug!(table, position, "row inserted");
        Ok(row)
    }

    /// Rows matching `predicate`, projected onto `columns` (schema order)
    /// when given.
    pub fn select(
        &mut self,
        table: &str,
        columns: Option<&[String]>,
        predicate: Option<&Predicate>,
    ) -> DbResult<Vec<Row>> {
        let doc = self.store.load(table)?;

        let projection = columns
            .map(|names| projection(table, &doc.columns, names))
            .transpose()?;

        let rows = match predicate {
            None => doc.rows,
            Some(pred) => {
                let index = column_index(table, &doc.columns, &pred.column)?;
                let key = coerce(&doc.columns.columns[index], &pred.value)?;
                self.route(table, index, pred, &key, doc.rows)?
            }
        };

        Ok(match projection {
            Some(indices) => rows
                .into_iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
            None => rows,
        })
    }

    fn route(
        &mut self,
        table: &str,
        index: usize,
        pred: &Predicate,
        key: &Value,
        rows: Vec<Row>,
    ) -> DbResult<Vec<Row>> {
        let column = pred.column.as_str();

        if let Some(tree) = self.indexes.loaded(table, column)?
            && let Some(hits) = probe_tree(tree, pred.op, key)
        {
            debug!(table, column, op = %pred.op, hits = hits.len(), "served by tree index");
            return Ok(hits);
        }

        if pred.op == CompareOp::Eq
            && let Some(positions) = self
                .indexes
                .linear(table)
                .and_then(|linear| linear.positions(column, key))
        {
            debug!(table, column, hits = positions.len(), "served by linear map");
            return Ok(positions
                .iter()
                .filter_map(|&p| rows.get(p).cloned())
                .collect());
        }

        debug!(table, column, op = %pred.op, "full scan");
        Ok(rows
            .into_iter()
            .filter(|row| compare(&row[index], pred.op, key))
            .collect())
    }

    /// Returns the number of rows changed.
    pub fn update(
        &mut self,
        table: &str,
        assignment: &Assignment,
        predicate: &Predicate,
    ) -> DbResult<usize> {
        let mut doc = self.store.load(table)?;

        let set_index = column_index(table, &doc.columns, &assignment.column)?;
        let value = coerce(&doc.columns.columns[set_index], &assignment.value)?;
        let matches = mutation_filter(table, &doc.columns, predicate)?;

        let mut count = 0;
        for row in doc.rows.iter_mut().filter(|row| matches(row)) {
            row[set_index] = value.clone();
            count += 1;
        }

        self.store.save(table, &doc)?;
        self.indexes.rebuild_linear(table, &doc);

        debug!(table, count, "rows updated");
        Ok(count)
    }

    /// Returns the number of rows removed.
    pub fn delete(&mut self, table: &str, predicate: &Predicate) -> DbResult<usize> {
        let mut doc = self.store.load(table)?;

        let matches = mutation_filter(table, &doc.columns, predicate)?;
        let before = doc.rows.len();
        doc.rows.retain(|row| !matches(row));
        let count = before - doc.rows.len();

        self.store.save(table, &doc)?;
        self.indexes.rebuild_linear(table, &doc);

        debug!(table, count, "rows deleted");
        Ok(count)
    }

    pub fn show_tables(&self) -> DbResult<Vec<String>> {
        self.store.list()
    }

    pub fn show_columns(&self, table: &str) -> DbResult<Schema> {
        Ok(self.store.load(table)?.columns)
    }
}

/// Serves a predicate from the tree; `None` when the operator has no tree
/// path.
fn probe_tree(tree: &RowIndex, op: CompareOp, key: &Value) -> Option<Vec<Row>> {
    let hits = match op {
        CompareOp::Eq => tree.search(key).cloned().into_iter().collect(),
        CompareOp::Gt => values(tree.range(Bound::Excluded(key), Bound::Unbounded)),
        CompareOp::Lt => values(tree.range(Bound::Unbounded, Bound::Excluded(key))),
        CompareOp::NotEq => return None,
    };
    Some(hits)
}

fn values(pairs: Vec<(Value, Row)>) -> Vec<Row> {
    pairs.into_iter().map(|(_, row)| row).collect()
}

fn compare(value: &Value, op: CompareOp, target: &Value) -> bool {
    match op {
        CompareOp::Eq => value == target,
        CompareOp::NotEq => value != target,
        CompareOp::Lt => value < target,
        CompareOp::Gt => value > target,
    }
}

/// Row filter for UPDATE and DELETE: `=` and `!=` compare the rendered
/// value with the literal text, `<` and `>` compare typed values.
fn mutation_filter(
    table: &str,
    schema: &Schema,
    pred: &Predicate,
) -> DbResult<impl Fn(&Row) -> bool + use<>> {
    let index = column_index(table, schema, &pred.column)?;
    let op = pred.op;

    let key = match op {
        CompareOp::Lt | CompareOp::Gt => Some(coerce(&schema.columns[index], &pred.value)?),
        CompareOp::Eq | CompareOp::NotEq => None,
    };
    let text = pred.value.clone();

    Ok(move |row: &Row| match &key {
        Some(key) => compare(&row[index], op, key),
        None => (row[index].to_string() == text) == (op == CompareOp::Eq),
    })
}

fn coerce(column: &Column, raw: &str) -> DbResult<Value> {
    column
        .ty
        .parse_value(raw)
        .ok_or_else(|| DbError::InvalidValue {
            column: column.name.clone(),
            ty: column.ty,
            raw: raw.to_string(),
        })
}

fn column_index(table: &str, schema: &Schema, column: &str) -> DbResult<usize> {
    schema
        .column_index(column)
        .ok_or_else(|| DbError::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        })
}

/// Positions of the requested columns, in schema order.
fn projection(table: &str, schema: &Schema, names: &[String]) -> DbResult<Vec<usize>> {
    for name in names {
        column_index(table, schema, name)?;
    }

    Ok(schema
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| names.contains(&c.name))
        .map(|(i, _)| i)
        .collect())
}
