//! Core type contracts shared by the row store, the index and the router.
//!
//! - No IO
//! - No dependencies on other modules

pub mod datatype;
pub mod schema;
pub mod value;

pub use datatype::DataType;
pub use schema::{Column, Schema};
pub use value::{Row, Value};
