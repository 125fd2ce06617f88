use std::ops::Bound;

use tracing::trace;

use crate::storage::btree::{
    internal::InternalNode,
    leaf::LeafNode,
    node::{BPlusNode, NodeId},
};

/// Smallest order for which both halves of a split keep at least one key.
pub const MIN_ORDER: usize = 2;

/// Order-bounded B+ tree mapping keys to opaque values.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. A node may
/// hold at most `order` keys; an insert that pushes a node past that bound
/// splits it before returning. Leaves form a singly linked list in ascending
/// key order for range scans.
///
/// The tree only grows: there is no removal, so depth never decreases.
#[derive(Debug, Clone)]
pub struct BPlusTree<K, V> {
    order: usize,
    root: NodeId,
    nodes: Vec<BPlusNode<K, V>>,
    len: usize,
}

impl<K: Ord + Clone, V: Clone> BPlusTree<K, V> {
    pub fn new(order: usize) -> Self {
        assert!(order >= MIN_ORDER, "B+Tree order must be ≥ {MIN_ORDER}");

        Self {
            order,
            root: 0,
            nodes: vec![BPlusNode::Leaf(LeafNode::empty())],
            len: 0,
        }
    }

    /// Assembles a tree from decoded nodes and restores the leaf chain.
    pub(super) fn from_arena(order: usize, root: NodeId, nodes: Vec<BPlusNode<K, V>>) -> Self {
        assert!(order >= MIN_ORDER, "B+Tree order must be ≥ {MIN_ORDER}");

        let len = nodes
            .iter()
            .map(|n| match n {
                BPlusNode::Leaf(l) => l.keys.len(),
                BPlusNode::Internal(_) => 0,
            })
            .sum();

        let mut tree = Self {
            order,
            root,
            nodes,
            len,
        };
        tree.relink_leaves();
        tree
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of (key, value) entries, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels; a tree whose root is a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut node = self.root;

        while let BPlusNode::Internal(internal) = &self.nodes[node] {
            node = internal.children[0];
            depth += 1;
        }

        depth
    }

    pub(super) fn root_id(&self) -> NodeId {
        self.root
    }

    pub(super) fn node(&self, id: NodeId) -> &BPlusNode<K, V> {
        &self.nodes[id]
    }

    /// Child slot to follow for `key`: the first separator strictly greater
    /// than `key`, so a key equal to a separator routes right.
    fn child_index(keys: &[K], key: &K) -> usize {
        keys.partition_point(|k| k <= key)
    }

    fn find_leaf(&self, key: &K) -> NodeId {
        let mut node = self.root;

        loop {
            match &self.nodes[node] {
                BPlusNode::Leaf(_) => return node,
                BPlusNode::Internal(internal) => {
                    node = internal.children[Self::child_index(&internal.keys, key)];
                }
            }
        }
    }

    fn leftmost_leaf(&self) -> NodeId {
        let mut node = self.root;

        while let BPlusNode::Internal(internal) = &self.nodes[node] {
            node = internal.children[0];
        }

        node
    }

    /// Returns the value of the first entry equal to `key` in the leaf the
    /// descent reaches.
    ///
    /// With duplicates only one value is reachable; the newest duplicate in
    /// that leaf sits first.
    pub fn search(&self, key: &K) -> Option<&V> {
        match &self.nodes[self.find_leaf(key)] {
            BPlusNode::Leaf(leaf) => leaf
                .keys
                .iter()
                .position(|k| k == key)
                .map(|i| &leaf.values[i]),
            BPlusNode::Internal(_) => unreachable!(),
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        if let Some((sep, right)) = self.insert_recursive(self.root, key, value) {
            // Root split → grow tree height
            let new_root = InternalNode {
                keys: vec![sep],
                children: vec![self.root, right],
            };

            self.root = self.nodes.len();
            self.nodes.push(BPlusNode::Internal(new_root));

            trace!(depth = self.depth(), "index root split");
        }

        self.len += 1;
    }

    /// Inclusive scan: every entry with `low <= key <= high`.
    pub fn range_search(&self, low: &K, high: &K) -> Vec<(K, V)> {
        self.range(Bound::Included(low), Bound::Included(high))
    }

    /// Walks the leaf chain from the leftmost leaf and collects the entries
    /// inside the bounds, in ascending key order. `Bound::Unbounded` acts as
    /// the infimum (low) or supremum (high).
    pub fn range(&self, low: Bound<&K>, high: Bound<&K>) -> Vec<(K, V)> {
        let mut out = Vec::new();
        let mut node = Some(self.leftmost_leaf());

        while let Some(id) = node {
            let leaf = match &self.nodes[id] {
                BPlusNode::Leaf(l) => l,
                _ => unreachable!(),
            };

            for (k, v) in leaf.keys.iter().zip(&leaf.values) {
                if above(k, high) {
                    return out;
                }
                if !below(k, low) {
                    out.push((k.clone(), v.clone()));
                }
            }

            node = leaf.next;
        }

        out
    }

    /// Rebuilds the leaf chain from the tree shape, left to right.
    pub fn relink_leaves(&mut self) {
        let mut leaves = Vec::new();
        self.collect_leaves(self.root, &mut leaves);

        let nexts = leaves.iter().skip(1).map(|&id| Some(id)).chain([None]);
        for (&id, next) in leaves.iter().zip(nexts) {
            if let BPlusNode::Leaf(leaf) = &mut self.nodes[id] {
                leaf.next = next;
            }
        }
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match &self.nodes[id] {
            BPlusNode::Leaf(_) => out.push(id),
            BPlusNode::Internal(internal) => {
                for &child in &internal.children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    fn insert_recursive(&mut self, node_id: NodeId, key: K, value: V) -> Option<(K, NodeId)> {
        let (idx, child) = match &mut self.nodes[node_id] {
            BPlusNode::Leaf(leaf) => {
                let pos = leaf.keys.partition_point(|k| *k < key);
                leaf.keys.insert(pos, key);
                leaf.values.insert(pos, value);

                let overflow = leaf.keys.len() > self.order;
                return if overflow {
                    Some(self.split_leaf(node_id))
                } else {
                    None
                };
            }

            BPlusNode::Internal(internal) => {
                let idx = Self::child_index(&internal.keys, &key);
                (idx, internal.children[idx])
            }
        };

        let (sep, new_child) = self.insert_recursive(child, key, value)?;

        let internal = match &mut self.nodes[node_id] {
            BPlusNode::Internal(i) => i,
            _ => unreachable!(),
        };
        internal.keys.insert(idx, sep);
        internal.children.insert(idx + 1, new_child);

        if internal.keys.len() > self.order {
            Some(self.split_internal(node_id))
        } else {
            None
        }
    }

    /// Splits an over-full leaf at its median. The median stays in the right
    /// half as its first key and is copied up as the separator.
    fn split_leaf(&mut self, leaf_id: NodeId) -> (K, NodeId) {
        let new_leaf_id = self.nodes.len();

        let leaf = match &mut self.nodes[leaf_id] {
            BPlusNode::Leaf(l) => l,
            _ => unreachable!(),
        };

        let split_at = leaf.keys.len() / 2;

        let new_keys = leaf.keys.split_off(split_at);
        let new_values = leaf.values.split_off(split_at);

        let separator = new_keys[0].clone();

        let new_leaf = LeafNode {
            keys: new_keys,
            values: new_values,
            next: leaf.next.take(),
        };

        leaf.next = Some(new_leaf_id);

        self.nodes.push(BPlusNode::Leaf(new_leaf));
        trace!(left = leaf_id, right = new_leaf_id, "index leaf split");

        (separator, new_leaf_id)
    }

    /// Splits an over-full internal node. The median moves up alone; the
    /// right half starts with the child just after it.
    fn split_internal(&mut self, node_id: NodeId) -> (K, NodeId) {
        let new_internal_id = self.nodes.len();

        let internal = match &mut self.nodes[node_id] {
            BPlusNode::Internal(i) => i,
            _ => unreachable!(),
        };

        let mid = internal.keys.len() / 2;

        let mut right_keys = internal.keys.split_off(mid);
        let separator = right_keys.remove(0);
        let right_children = internal.children.split_off(mid + 1);

        let new_internal = InternalNode {
            keys: right_keys,
            children: right_children,
        };

        self.nodes.push(BPlusNode::Internal(new_internal));
        trace!(left = node_id, right = new_internal_id, "index internal split");

        (separator, new_internal_id)
    }
}

fn below<K: Ord>(key: &K, low: Bound<&K>) -> bool {
    match low {
        Bound::Included(l) => key < l,
        Bound::Excluded(l) => key <= l,
        Bound::Unbounded => false,
    }
}

fn above<K: Ord>(key: &K, high: Bound<&K>) -> bool {
    match high {
        Bound::Included(h) => key > h,
        Bound::Excluded(h) => key >= h,
        Bound::Unbounded => false,
    }
}

impl<K: Ord + Clone, V: Clone> BPlusTree<K, V> {
    /// Checks the structural invariants.
    ///
    /// # Panics
    ///
    /// Panics on the first violated invariant.
    pub fn assert_invariants(&self) {
        assert!(self.order >= MIN_ORDER);

        let mut leaves = Vec::new();
        self.assert_node(self.root, &mut leaves);

        // leaf chain must visit the leaves in tree order, then stop
        let mut chain = Vec::new();
        let mut node = Some(self.leftmost_leaf());
        while let Some(id) = node {
            chain.push(id);
            node = match &self.nodes[id] {
                BPlusNode::Leaf(l) => l.next,
                _ => panic!("leaf chain reaches internal node {id}"),
            };
        }
        assert_eq!(chain, leaves, "leaf chain out of tree order");

        let mut total = 0;
        let mut last: Option<&K> = None;
        for &id in &leaves {
            for k in self.nodes[id].keys() {
                if let Some(prev) = last {
                    assert!(prev <= k, "leaf keys not ascending across leaves");
                }
                last = Some(k);
                total += 1;
            }
        }
        assert_eq!(total, self.len);
    }

    fn assert_node(&self, id: NodeId, leaves: &mut Vec<NodeId>) {
        match &self.nodes[id] {
            BPlusNode::Leaf(l) => {
                assert_eq!(l.keys.len(), l.values.len());
                assert!(l.keys.windows(2).all(|w| w[0] <= w[1]));
                assert!(l.keys.len() <= self.order, "leaf {id} over-full");

                leaves.push(id);
            }

            BPlusNode::Internal(i) => {
                assert_eq!(i.children.len(), i.keys.len() + 1);
                assert!(i.keys.windows(2).all(|w| w[0] <= w[1]));
                assert!(i.keys.len() <= self.order, "internal {id} over-full");

                for &child in &i.children {
                    self.assert_node(child, leaves);
                }
            }
        }
    }
}
