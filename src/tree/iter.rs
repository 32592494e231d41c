//! In-order Traversal Module
//!
//! Lazy ascending walk over an `AvlTree` that follows parent links, so no
//! auxiliary stack is needed. Each call to `AvlTree::iter` starts a fresh walk;
//! the shared borrow keeps the tree frozen for the iterator's lifetime.

use std::iter::FusedIterator;

use crate::tree::node::NodeId;
use crate::tree::AvlTree;

// == Iter ==
/// Iterator over `(&K, &V)` in ascending key order.
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    tree: &'a AvlTree<K, V>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a AvlTree<K, V>, front: Option<NodeId>, len: usize) -> Self {
        Self {
            tree,
            next: front,
            remaining: len,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.successor(id);
        self.remaining -= 1;
        let node = self.tree.node(id);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
