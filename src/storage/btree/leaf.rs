use crate::storage::btree::node::NodeId;

#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    pub keys: Vec<K>,
    pub values: Vec<V>,       // values[i] belongs to keys[i]; duplicates kept apart
    pub next: Option<NodeId>, // right sibling
}

impl<K, V> LeafNode<K, V> {
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            next: None,
        }
    }
}
