//! Tree Node Module
//!
//! Defines the arena slot that stores one key-value entry of the AVL tree.

/// Index of a node inside the tree arena.
pub(crate) type NodeId = usize;

// == Node ==
/// One stored entry.
///
/// Child links own their subtree (a node is only reachable through its
/// parent). The parent link is a plain back-reference used by rotations,
/// deletion and the in-order walk; it is never followed to release memory.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    /// Leaf = 1, absent child = 0
    pub(crate) height: i32,
}

impl<K, V> Node<K, V> {
    // == Constructor ==
    /// Creates a detached leaf hanging below `parent`.
    pub(crate) fn leaf(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            parent,
            height: 1,
        }
    }

    /// Returns the child on the requested side.
    pub(crate) fn child(&self, left: bool) -> Option<NodeId> {
        if left {
            self.left
        } else {
            self.right
        }
    }
}
