//! The polymorphic free-block index.
//!
//! List and tree are mutually exclusive at runtime, selected once by the
//! strategy latch: first/next-fit share the address-sorted list, best/worst
//! share the AVL tree. Modeling this as a tagged enum (rather than two
//! always-live structures) keeps a stray `insert` from silently going to
//! the wrong representation.

mod list;
mod tree;

pub use list::FreeList;
pub use tree::FreeTree;

use crate::block::Block;
use crate::strategy::Strategy;
use core::ptr::NonNull;

pub enum Index {
    List(FreeList),
    Tree(FreeTree),
}

impl Index {
    pub fn for_strategy(strategy: Strategy) -> Self {
        if strategy.uses_tree() {
            Index::Tree(FreeTree::new())
        } else {
            Index::List(FreeList::new())
        }
    }

    /// # Safety
    /// `block` must not already be linked into this or any other index.
    pub unsafe fn insert(&mut self, block: NonNull<Block>) {
        match self {
            // SAFETY: forwarded, same precondition.
            Index::List(l) => unsafe { l.insert(block) },
            // SAFETY: forwarded, same precondition.
            Index::Tree(t) => unsafe { t.insert(block) },
        }
    }

    /// # Safety
    /// `block` must currently be a member of this index.
    pub unsafe fn remove(&mut self, block: NonNull<Block>) {
        match self {
            // SAFETY: forwarded, same precondition.
            Index::List(l) => unsafe { l.remove(block) },
            // SAFETY: forwarded, same precondition.
            Index::Tree(t) => unsafe { t.remove(block) },
        }
    }

    pub fn find(&mut self, strategy: Strategy, need: usize) -> Option<NonNull<Block>> {
        match (self, strategy) {
            (Index::List(l), Strategy::First) => l.find_first(need),
            (Index::List(l), Strategy::Next) => l.find_next(need),
            (Index::Tree(t), Strategy::Best) => t.find_best(need),
            (Index::Tree(t), Strategy::Worst) => t.find_worst(need),
            _ => unreachable!("strategy latch guarantees the index kind matches the strategy"),
        }
    }
}
