pub mod index_catalog;
pub mod linear;

pub use index_catalog::{IndexCatalog, IndexEntry, RowIndex};
pub use linear::LinearIndex;
