//! Ordered index tree and its document codec.

pub mod b_plus_tree;
pub mod codec;
pub mod internal;
pub mod leaf;
pub mod node;

mod unit_tests;

pub use b_plus_tree::{BPlusTree, MIN_ORDER};
pub use codec::{ChildDocument, DecodeError, NodeDocument, decode, encode};
pub use node::{BPlusNode, NodeId};
