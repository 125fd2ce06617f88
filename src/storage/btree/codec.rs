//! Whole-tree document codec.
//!
//! A tree is written as one recursive document mirroring the node shape:
//!
//! ```text
//! { "is_leaf": <bool>, "keys": [ ... ], "children": [ <node> | <value>, ... ] }
//! ```
//!
//! Internal nodes list nested node documents as children, leaves list their
//! raw values. Leaf links are not written; [`decode`] rebuilds them from the
//! tree shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::btree::{
    b_plus_tree::BPlusTree,
    internal::InternalNode,
    leaf::LeafNode,
    node::{BPlusNode, NodeId},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument<K, V> {
    pub is_leaf: bool,
    pub keys: Vec<K>,
    pub children: Vec<ChildDocument<K, V>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildDocument<K, V> {
    Node(Box<NodeDocument<K, V>>),
    Value(V),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("leaf holds {keys} keys but {children} values")]
    LeafArity { keys: usize, children: usize },

    #[error("internal node holds {keys} keys but {children} children")]
    InternalArity { keys: usize, children: usize },

    #[error("leaf child is a nested node document")]
    NodeInLeaf,

    #[error("internal child is a raw value")]
    ValueInInternal,

    #[error("node keys are not in ascending order")]
    Unsorted,
}

pub fn encode<K: Ord + Clone, V: Clone>(tree: &BPlusTree<K, V>) -> NodeDocument<K, V> {
    encode_node(tree, tree.root_id())
}

fn encode_node<K: Ord + Clone, V: Clone>(tree: &BPlusTree<K, V>, id: NodeId) -> NodeDocument<K, V> {
    match tree.node(id) {
        BPlusNode::Leaf(leaf) => NodeDocument {
            is_leaf: true,
            keys: leaf.keys.clone(),
            children: leaf.values.iter().cloned().map(ChildDocument::Value).collect(),
        },

        BPlusNode::Internal(internal) => NodeDocument {
            is_leaf: false,
            keys: internal.keys.clone(),
            children: internal
                .children
                .iter()
                .map(|&child| ChildDocument::Node(Box::new(encode_node(tree, child))))
                .collect(),
        },
    }
}

/// Rebuilds a tree from its document, validating node shape.
///
/// The document does not record the order it was written with. The decoded
/// tree uses `order`, or the widest node in the document if that is larger,
/// so a tree written under a bigger order stays usable.
pub fn decode<K: Ord + Clone, V: Clone>(
    doc: NodeDocument<K, V>,
    order: usize,
) -> Result<BPlusTree<K, V>, DecodeError> {
    let mut nodes = Vec::new();
    let mut widest = 0;
    let root = decode_node(doc, &mut nodes, &mut widest)?;

    Ok(BPlusTree::from_arena(order.max(widest), root, nodes))
}

fn decode_node<K: Ord, V>(
    doc: NodeDocument<K, V>,
    nodes: &mut Vec<BPlusNode<K, V>>,
    widest: &mut usize,
) -> Result<NodeId, DecodeError> {
    let NodeDocument {
        is_leaf,
        keys,
        children,
    } = doc;

    *widest = (*widest).max(keys.len());
    if !keys.is_sorted() {
        return Err(DecodeError::Unsorted);
    }

    let node = if is_leaf {
        if children.len() != keys.len() {
            return Err(DecodeError::LeafArity {
                keys: keys.len(),
                children: children.len(),
            });
        }

        let values = children
            .into_iter()
            .map(|child| match child {
                ChildDocument::Value(v) => Ok(v),
                ChildDocument::Node(_) => Err(DecodeError::NodeInLeaf),
            })
            .collect::<Result<Vec<_>, _>>()?;

        BPlusNode::Leaf(LeafNode {
            keys,
            values,
            next: None,
        })
    } else {
        if children.len() != keys.len() + 1 {
            return Err(DecodeError::InternalArity {
                keys: keys.len(),
                children: children.len(),
            });
        }

        let mut child_ids = Vec::with_capacity(children.len());
        for child in children {
            match child {
                ChildDocument::Node(node) => child_ids.push(decode_node(*node, nodes, widest)?),
                ChildDocument::Value(_) => return Err(DecodeError::ValueInInternal),
            }
        }

        BPlusNode::Internal(InternalNode {
            keys,
            children: child_ids,
        })
    };

    nodes.push(node);
    Ok(nodes.len() - 1)
}
