//! Command text → [`ast::Statement`].

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod parser;


pub use parser::parse;
