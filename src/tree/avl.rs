//! AVL Tree Module
//!
//! Height-balanced binary search tree stored in an arena of nodes.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

use tracing::trace;

use crate::error::{CacheError, Result};
use crate::tree::node::{Node, NodeId};
use crate::tree::Iter;

// == AVL Tree ==
/// Ordered map with O(log n) insert, lookup and removal.
///
/// Nodes live in a slot arena; vacated slots are recycled through a free list.
/// Dropping the tree drops the arena, which releases every node exactly once.
#[derive(Debug)]
pub struct AvlTree<K, V> {
    /// Node slots, `None` when vacant
    nodes: Vec<Option<Node<K, V>>>,
    /// Vacant slot indices ready for reuse
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AvlTree<K, V> {
    // == Constructor ==
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the whole tree (0 when empty, 1 for a single node).
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Entry currently at the root.
    pub fn root(&self) -> Option<(&K, &V)> {
        self.root.map(|root| self.entry(root))
    }

    // == Extremes ==
    /// Entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.root.map(|root| self.entry(self.extreme(root, true)))
    }

    /// Entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.root.map(|root| self.entry(self.extreme(root, false)))
    }

    /// In-order iterator over all entries, smallest key first.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let front = self.root.map(|root| self.extreme(root, true));
        Iter::new(self, front, self.len)
    }

    // == Arena Access ==
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        match self.nodes.get(id) {
            Some(Some(node)) => node,
            _ => unreachable!("dangling node id {id}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match self.nodes.get_mut(id) {
            Some(Some(node)) => node,
            _ => unreachable!("dangling node id {id}"),
        }
    }

    fn entry(&self, id: NodeId) -> (&K, &V) {
        let node = self.node(id);
        (&node.key, &node.value)
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node<K, V> {
        match self.nodes.get_mut(id).and_then(Option::take) {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => unreachable!("double release of node {id}"),
        }
    }

    // == Navigation ==
    /// Leftmost (`left == true`) or rightmost node of the subtree at `id`.
    fn extreme(&self, mut id: NodeId, left: bool) -> NodeId {
        while let Some(next) = self.node(id).child(left) {
            id = next;
        }
        id
    }

    /// In-order successor of `id`.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(id).right {
            return Some(self.extreme(right, true));
        }
        let mut child = id;
        let mut parent = self.node(id).parent;
        while let Some(p) = parent {
            if self.node(p).left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.node(p).parent;
        }
        None
    }

    /// Points `parent`'s link that currently holds `old` at `new` instead.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let node = self.node_mut(p);
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }
    }

    // == Balance Bookkeeping ==
    fn height_of(&self, id: Option<NodeId>) -> i32 {
        id.map_or(0, |id| self.node(id).height)
    }

    fn update_height(&mut self, id: NodeId) {
        let node = self.node(id);
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.node_mut(id).height = height;
    }

    fn balance_factor(&self, id: NodeId) -> i32 {
        let node = self.node(id);
        self.height_of(node.left) - self.height_of(node.right)
    }

    // == Rotations ==
    /// Lifts the right child of `x` into its place. Returns the new subtree root.
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let y = match self.node(x).right {
            Some(y) => y,
            None => unreachable!("rotate_left without right child"),
        };
        let inner = self.node(y).left;
        let parent = self.node(x).parent;

        self.node_mut(x).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(x);
        }
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).parent = parent;
        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Lifts the left child of `x` into its place. Returns the new subtree root.
    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let y = match self.node(x).left {
            Some(y) => y,
            None => unreachable!("rotate_right without left child"),
        };
        let inner = self.node(y).right;
        let parent = self.node(x).parent;

        self.node_mut(x).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(x);
        }
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).parent = parent;
        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Restores heights and balance on every ancestor from `start` up to the root.
    fn rebalance_from(&mut self, start: Option<NodeId>) {
        let mut current = start;
        while let Some(id) = current {
            self.update_height(id);
            let balance = self.balance_factor(id);

            let subtree = if balance > 1 {
                let left = self.node(id).left.unwrap_or_else(|| unreachable!());
                if self.balance_factor(left) < 0 {
                    trace!(node = id, "left-right rotation");
                    self.rotate_left(left);
                } else {
                    trace!(node = id, "left-left rotation");
                }
                self.rotate_right(id)
            } else if balance < -1 {
                let right = self.node(id).right.unwrap_or_else(|| unreachable!());
                if self.balance_factor(right) > 0 {
                    trace!(node = id, "right-left rotation");
                    self.rotate_right(right);
                } else {
                    trace!(node = id, "right-right rotation");
                }
                self.rotate_left(id)
            } else {
                id
            };

            debug_assert!(self.balance_factor(subtree).abs() <= 1);
            current = self.node(subtree).parent;
        }
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    // == Lookup ==
    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(id),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Returns the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| &self.node(id).value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// Only the value is reachable; the key (and therefore the shape) cannot change.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        Some(&mut self.node_mut(id).value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    // == Insert ==
    /// Inserts `key` -> `value`.
    ///
    /// An existing key keeps its node and position; only the value is replaced
    /// and the old value returned. A new key is attached as a leaf and every
    /// ancestor is rebalanced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent = None;
        let mut go_left = false;
        let mut current = self.root;

        while let Some(id) = current {
            let node = self.node_mut(id);
            match key.cmp(&node.key) {
                Ordering::Equal => return Some(mem::replace(&mut node.value, value)),
                Ordering::Less => {
                    go_left = true;
                    current = node.left;
                }
                Ordering::Greater => {
                    go_left = false;
                    current = node.right;
                }
            }
            parent = Some(id);
        }

        let id = self.alloc(Node::leaf(key, value, parent));
        match parent {
            None => self.root = Some(id),
            Some(p) if go_left => self.node_mut(p).left = Some(id),
            Some(p) => self.node_mut(p).right = Some(id),
        }
        self.len += 1;
        self.rebalance_from(parent);
        None
    }

    // == Remove ==
    /// Removes `key` and returns its value, or `None` when absent (tree untouched).
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        Some(self.remove_node(id).1)
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let root = self.root?;
        let id = self.extreme(root, true);
        Some(self.remove_node(id))
    }

    fn remove_node(&mut self, id: NodeId) -> (K, V) {
        let node = self.node(id);
        // Two children: the successor's entry moves into `id` and the
        // successor node (at most one child) is unlinked instead.
        let target = match (node.left, node.right) {
            (Some(_), Some(right)) => {
                let successor = self.extreme(right, true);
                self.swap_entries(id, successor);
                successor
            }
            _ => id,
        };

        let node = self.node(target);
        let child = node.left.or(node.right);
        let parent = node.parent;
        if let Some(child) = child {
            self.node_mut(child).parent = parent;
        }
        self.replace_child(parent, target, child);

        let removed = self.release(target);
        self.len -= 1;
        self.rebalance_from(parent);
        (removed.key, removed.value)
    }

    fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        if let (Some(x), Some(y)) = (head[lo].as_mut(), tail[0].as_mut()) {
            mem::swap(&mut x.key, &mut y.key);
            mem::swap(&mut x.value, &mut y.value);
        }
    }

    // == Invariant Check ==
    /// Walks the whole tree and verifies ordering, balance, cached heights,
    /// parent links and the entry count.
    pub fn check_invariants(&self) -> Result<()> {
        if let Some(root) = self.root {
            if self.node(root).parent.is_some() {
                return Err(CacheError::InvariantViolation(
                    "root has a parent".to_string(),
                ));
            }
        }
        let (count, _) = self.check_subtree(self.root)?;
        if count != self.len {
            return Err(CacheError::InvariantViolation(format!(
                "counted {count} nodes but len is {}",
                self.len
            )));
        }

        let mut previous: Option<&K> = None;
        for (key, _) in self.iter() {
            if previous.is_some_and(|prev| prev >= key) {
                return Err(CacheError::InvariantViolation(
                    "in-order keys are not strictly ascending".to_string(),
                ));
            }
            previous = Some(key);
        }
        Ok(())
    }

    /// Returns (node count, height) of the subtree.
    fn check_subtree(&self, id: Option<NodeId>) -> Result<(usize, i32)> {
        let Some(id) = id else {
            return Ok((0, 0));
        };
        let node = self.node(id);
        for child in [node.left, node.right].into_iter().flatten() {
            if self.node(child).parent != Some(id) {
                return Err(CacheError::InvariantViolation(format!(
                    "node {child} has a stale parent link"
                )));
            }
        }

        let (left_count, left_height) = self.check_subtree(node.left)?;
        let (right_count, right_height) = self.check_subtree(node.right)?;
        let height = 1 + left_height.max(right_height);
        if node.height != height {
            return Err(CacheError::InvariantViolation(format!(
                "node {id} caches height {} but has {height}",
                node.height
            )));
        }
        if (left_height - right_height).abs() > 1 {
            return Err(CacheError::InvariantViolation(format!(
                "node {id} has balance factor {}",
                left_height - right_height
            )));
        }
        Ok((left_count + right_count + 1, height))
    }
}
