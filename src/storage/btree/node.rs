use crate::storage::btree::{internal::InternalNode, leaf::LeafNode};

/// Position of a node inside the tree's arena.
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub enum BPlusNode<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

impl<K, V> BPlusNode<K, V> {
    pub fn keys(&self) -> &[K] {
        match self {
            BPlusNode::Internal(i) => &i.keys,
            BPlusNode::Leaf(l) => &l.keys,
        }
    }
}
