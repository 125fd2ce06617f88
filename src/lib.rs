pub mod config;
pub mod error;

pub mod api;
pub mod catalog;
pub mod frontend;
pub mod storage;
pub mod types;
