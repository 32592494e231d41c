//! Tree Module
//!
//! Self-balancing (AVL) binary search tree used as the ordered store
//! underneath the cache.

mod avl;
mod iter;
mod node;


pub use avl::AvlTree;
pub use iter::Iter;
