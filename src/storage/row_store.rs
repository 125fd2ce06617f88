//! Flat per-table documents: schema plus the full row list.
//!
//! Every mutation is a whole-document rewrite. There is no write-ahead log
//! and no atomic rename, so a crash during a write can leave the document
//! truncated.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::storage::{DOCUMENT_EXTENSION, is_index_stem, table_file_name};
use crate::types::{Row, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDocument {
    pub columns: Schema,
    pub rows: Vec<Row>,
}

impl TableDocument {
    pub fn new(columns: Schema) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }
}

pub struct RowStore {
    root: PathBuf,
}

impl RowStore {
    /// Opens the storage root, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> DbResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| DbError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.root.join(table_file_name(name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.table_path(name).is_file()
    }

    pub fn create(&self, name: &str, columns: Schema) -> DbResult<TableDocument> {
        if is_index_stem(name) {
            return Err(DbError::ReservedName(name.to_string()));
        }
        if self.exists(name) {
            return Err(DbError::TableExists(name.to_string()));
        }

        let doc = TableDocument::new(columns);
        self.save(name, &doc)?;
        Ok(doc)
    }

    pub fn load(&self, name: &str) -> DbResult<TableDocument> {
        let path = self.table_path(name);

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DbError::TableNotFound(name.to_string()));
            }
            Err(e) => return Err(DbError::io(path, e)),
        };

        let doc: TableDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| DbError::corrupt(&path, e))?;

        let width = doc.columns.len();
        if let Some(pos) = doc.rows.iter().position(|r| r.len() != width) {
            return Err(DbError::corrupt(
                path,
                format!("row {pos} has {} values, schema has {width}", doc.rows[pos].len()),
            ));
        }

        Ok(doc)
    }

    pub fn save(&self, name: &str, doc: &TableDocument) -> DbResult<()> {
        let path = self.table_path(name);
        let file = File::create(&path).map_err(|e| DbError::io(&path, e))?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, doc).map_err(|e| DbError::io(&path, e.into()))?;
        writer.flush().map_err(|e| DbError::io(&path, e))?;

        debug!(table = name, rows = doc.rows.len(), "row document written");
        Ok(())
    }

    pub fn remove(&self, name: &str) -> DbResult<()> {
        let path = self.table_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DbError::TableNotFound(name.to_string()))
            }
            Err(e) => Err(DbError::io(path, e)),
        }
    }

    /// Table names found in the storage root, sorted. Index documents are
    /// skipped.
    pub fn list(&self) -> DbResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| DbError::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| DbError::io(&self.root, e))?.path();

            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && !is_index_stem(stem)
            {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}
