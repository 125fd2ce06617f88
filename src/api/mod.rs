pub mod db;
pub mod result;


pub use db::Database;
pub use result::QueryResult;
