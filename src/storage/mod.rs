//! On-disk layout: one `<table>.json` row document per table and one
//! `<table>_<column>_index.json` tree document per indexed column, side by
//! side in the same storage root.

pub mod btree;
pub mod row_store;

pub const DOCUMENT_EXTENSION: &str = "json";
const INDEX_STEM_SUFFIX: &str = "_index";

pub fn table_file_name(table: &str) -> String {
    format!("{table}.{DOCUMENT_EXTENSION}")
}

pub fn index_file_name(table: &str, column: &str) -> String {
    format!("{table}_{column}{INDEX_STEM_SUFFIX}.{DOCUMENT_EXTENSION}")
}

/// True for file stems that name an index document rather than a table.
pub fn is_index_stem(stem: &str) -> bool {
    stem.ends_with(INDEX_STEM_SUFFIX)
}
