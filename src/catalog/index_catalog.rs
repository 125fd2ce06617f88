use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::linear::LinearIndex;
use crate::error::{DbError, DbResult};
use crate::storage::btree::{BPlusTree, NodeDocument, decode, encode};
use crate::storage::index_file_name;
use crate::storage::row_store::TableDocument;
use crate::types::{Row, Schema, Value};

/// Tree-backed index over one column: column value → full row.
pub type RowIndex = BPlusTree<Value, Row>;

#[derive(Debug)]
pub struct IndexEntry {
    tree: RowIndex,
    path: PathBuf,
}

impl IndexEntry {
    pub fn tree(&self) -> &RowIndex {
        &self.tree
    }
}

/// In-process registry of loaded indexes.
///
/// Two independent layers are kept per table:
/// - a tree per (table, column), fed only by inserts, loaded lazily from its
///   backing document and rewritten in full after every insert;
/// - a linear value → row-position map over every column, held in memory
///   only and rebuilt wholesale after update, delete and truncate.
///
/// Trees are never corrected on update or delete, so they can report rows
/// that no longer exist in the row store.
pub struct IndexCatalog {
    root: PathBuf,
    order: usize,
    trees: HashMap<(String, String), IndexEntry>,
    linear: HashMap<String, LinearIndex>,
}

impl IndexCatalog {
    pub fn new(root: impl Into<PathBuf>, order: usize) -> Self {
        Self {
            root: root.into(),
            order,
            trees: HashMap::new(),
            linear: HashMap::new(),
        }
    }

    pub fn index_path(&self, table: &str, column: &str) -> PathBuf {
        self.root.join(index_file_name(table, column))
    }

    /// Returns the tree for (table, column), loading it from its backing
    /// document on first use or creating it empty.
    ///
    /// A tree loaded once is never reloaded, even if the document changes.
    pub fn get_or_create(
        &mut self,
        table: &str,
        column: &str,
        order: usize,
    ) -> DbResult<&mut IndexEntry> {
        let path = self.index_path(table, column);

        match self.trees.entry((table.to_string(), column.to_string())) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let tree = match read_tree(&path, order)? {
                    Some(tree) => tree,
                    None => {
                        debug!(table, column, order, "creating empty index");
                        BPlusTree::new(order)
                    }
                };
                Ok(e.insert(IndexEntry { tree, path }))
            }
        }
    }

    /// Returns the tree for (table, column) if it is loaded or has a backing
    /// document; never creates one.
    pub fn loaded(&mut self, table: &str, column: &str) -> DbResult<Option<&RowIndex>> {
        let key = (table.to_string(), column.to_string());

        if !self.trees.contains_key(&key) {
            let path = self.index_path(table, column);
            match read_tree(&path, self.order)? {
                Some(tree) => {
                    self.trees.insert(key.clone(), IndexEntry { tree, path });
                }
                None => return Ok(None),
            }
        }

        Ok(self.trees.get(&key).map(IndexEntry::tree))
    }

    /// Adds one row to the (table, first_column) tree and rewrites its
    /// backing document. Other columns get no tree.
    pub fn record_insert(
        &mut self,
        table: &str,
        first_column: &str,
        key: Value,
        full_row: Row,
    ) -> DbResult<()> {
        let order = self.order;
        let entry = self.get_or_create(table, first_column, order)?;

        entry.tree.insert(key, full_row);
        write_tree(&entry.path, &entry.tree)
    }

    /// Discards the linear map of `table` and recomputes it from the rows.
    pub fn rebuild_linear(&mut self, table: &str, doc: &TableDocument) {
        self.linear
            .insert(table.to_string(), LinearIndex::build(doc));
    }

    /// Keeps an existing linear map in step with an appended row.
    pub fn extend_linear(&mut self, table: &str, columns: &Schema, position: usize, row: &Row) {
        if let Some(linear) = self.linear.get_mut(table) {
            linear.push_row(columns, position, row);
        }
    }

    pub fn linear(&self, table: &str) -> Option<&LinearIndex> {
        self.linear.get(table)
    }

    /// Forgets every index of `table` and deletes the backing documents of
    /// its columns.
    pub fn drop_table(&mut self, table: &str, columns: &Schema) -> DbResult<()> {
        self.trees.retain(|(t, _), _| t != table);
        self.linear.remove(table);

        for column in &columns.columns {
            let path = self.index_path(table, &column.name);
            match fs::remove_file(&path) {
                Ok(()) => info!(table, column = %column.name, "index document removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(DbError::io(path, e)),
            }
        }

        Ok(())
    }
}

/// Reads a tree document; a missing document means no index yet.
fn read_tree(path: &Path, order: usize) -> DbResult<Option<RowIndex>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DbError::io(path, e)),
    };

    let doc: NodeDocument<Value, Row> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| DbError::corrupt(path, e))?;
    let tree = decode(doc, order).map_err(|e| DbError::corrupt(path, e))?;

    debug!(path = %path.display(), entries = tree.len(), depth = tree.depth(), "index loaded");
    Ok(Some(tree))
}

fn write_tree(path: &Path, tree: &RowIndex) -> DbResult<()> {
    let file = File::create(path).map_err(|e| DbError::io(path, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &encode(tree)).map_err(|e| DbError::io(path, e.into()))?;
    writer.flush().map_err(|e| DbError::io(path, e))?;

    debug!(path = %path.display(), entries = tree.len(), "index persisted");
    Ok(())
}
