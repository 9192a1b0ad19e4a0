use core::sync::atomic::{AtomicU32, Ordering};

use crate::raw::{Generation, Handle};

/// Identifies one tree instance so that positions cannot be used across trees.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) struct TreeId(u32);

static NEXT_TREE_ID: AtomicU32 = AtomicU32::new(0);

impl TreeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An opaque handle to one node of a [`LinkedBinaryTree`](crate::LinkedBinaryTree).
///
/// A `Position` exposes nothing about the tree's linkage; it is only meaningful when handed back
/// to the tree that issued it. Once its node is removed the position goes stale and every tree
/// operation given it fails with [`TreeError::InvalidPosition`](crate::TreeError::InvalidPosition),
/// even if the underlying storage has since been reused.
///
/// Rotations move nodes around without invalidating positions: a position follows its node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    tree: TreeId,
    handle: Handle,
    generation: Generation,
}

impl Position {
    pub(crate) const fn new(tree: TreeId, handle: Handle, generation: Generation) -> Self {
        Self {
            tree,
            handle,
            generation,
        }
    }

    #[inline]
    pub(crate) const fn tree(self) -> TreeId {
        self.tree
    }

    #[inline]
    pub(crate) const fn handle(self) -> Handle {
        self.handle
    }

    #[inline]
    pub(crate) const fn generation(self) -> Generation {
        self.generation
    }
}
