use std::path::{Path, PathBuf};

use minidb::api::{Database, QueryResult};
use minidb::config::DbConfig;
use minidb::types::Row;

/// Database over a fresh random directory, removed on drop.
pub struct TestDB {
    pub db: Database,
    dir: PathBuf,
}

#[allow(dead_code)]
impl TestDB {
    pub fn new() -> Self {
        Self::with_order(4)
    }

    pub fn with_order(order: usize) -> Self {
        super::init_tracing_for_tests();

        let dir = std::env::temp_dir().join(format!("minidb_test_{}", rand::random::<u64>()));
        let db = Database::open(DbConfig::new(&dir).with_index_order(order)).unwrap();
        Self { db, dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Opens a second database over the same directory, as a new process
    /// would see it.
    pub fn reopen(&mut self) {
        let config = self.db.config().clone();
        self.db = Database::open(config).unwrap();
    }

    /// Like [`TestDB::reopen`], with a different configured index order.
    pub fn reopen_with_order(&mut self, order: usize) {
        let config = self.db.config().clone().with_index_order(order);
        self.db = Database::open(config).unwrap();
    }

    pub fn exec(&mut self, sql: &str) -> Result<QueryResult, anyhow::Error> {
        Ok(self.db.query(sql)?)
    }

    pub fn query(&mut self, sql: &str) -> Result<Vec<Row>, anyhow::Error> {
        match self.exec(sql)? {
            QueryResult::Rows(rows) => Ok(rows),
            other => anyhow::bail!("Expected rows, got {:?}", other),
        }
    }
}

impl Drop for TestDB {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}
