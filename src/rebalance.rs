use crate::balanceable::BalanceableBinaryTree;
use crate::error::Result;
use crate::position::Position;

/// Rebalancing hooks a [`TreeMap`](crate::TreeMap) calls after it touches its tree.
///
/// The map performs plain binary-search-tree edits and then hands the affected position to its
/// strategy. Every hook defaults to doing nothing, which gives an ordinary unbalanced BST
/// ([`Unbalanced`]); [`Avl`](crate::Avl) overrides the insert and delete hooks.
pub trait Rebalance {
    /// Called after an entry was inserted at the former sentinel `p`.
    fn rebalance_insert<E>(&self, tree: &mut BalanceableBinaryTree<E>, p: Position) -> Result<()> {
        let _ = (tree, p);
        Ok(())
    }

    /// Called after a node was spliced out; `p` is the sibling of the removed sentinel, now sitting
    /// where the removed node was.
    fn rebalance_delete<E>(&self, tree: &mut BalanceableBinaryTree<E>, p: Position) -> Result<()> {
        let _ = (tree, p);
        Ok(())
    }

    /// Called after a lookup ended at `p` (an entry or the sentinel where the search missed).
    ///
    /// Lookups take the map by shared reference, so this hook may observe the tree but not
    /// restructure it.
    fn rebalance_access<E>(&self, tree: &BalanceableBinaryTree<E>, p: Position) {
        let _ = (tree, p);
    }
}

/// No rebalancing: a plain binary search tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Unbalanced;

impl Rebalance for Unbalanced {}
