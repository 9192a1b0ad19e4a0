//! AVL rebalancing.
//!
//! Each internal node caches the height of its subtree in the tree's auxiliary field (sentinels
//! keep 0). After an insertion or removal the ancestors of the change are walked bottom-up; a node
//! whose children differ in height by more than one is repaired with a trinode restructuring
//! around its taller grandchild.

use tracing::debug;

use crate::balanceable::BalanceableBinaryTree;
use crate::comparator::NaturalOrder;
use crate::error::{Result, TreeError};
use crate::position::Position;
use crate::raw::Side;
use crate::rebalance::Rebalance;
use crate::tree_map::TreeMap;

/// Height-balancing strategy for [`TreeMap`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Avl;

/// A sorted map kept height-balanced with AVL rotations.
///
/// # Examples
///
/// ```
/// use avl_tree_map::AvlTreeMap;
///
/// let mut map: AvlTreeMap<i32, &str> = AvlTreeMap::new();
/// for (key, value) in [(14, "n"), (7, "g"), (17, "q"), (4, "d"), (11, "k"), (53, "z"), (13, "m")] {
///     map.put(key, value)?;
/// }
/// assert!(map.sanity_check());
/// assert_eq!(map.first_entry().map(|e| *e.key()), Some(4));
/// assert_eq!(map.ceiling_entry(&12)?.map(|e| *e.value()), Some("m"));
/// # Ok::<(), avl_tree_map::TreeError>(())
/// ```
pub type AvlTreeMap<K, V, C = NaturalOrder> = TreeMap<K, V, C, Avl>;

impl Avl {
    fn height<E>(tree: &BalanceableBinaryTree<E>, p: Option<Position>) -> Result<i32> {
        match p {
            Some(p) => tree.aux(p),
            None => Ok(0),
        }
    }

    fn child_heights<E>(tree: &BalanceableBinaryTree<E>, p: Position) -> Result<(i32, i32)> {
        Ok((Self::height(tree, tree.left(p)?)?, Self::height(tree, tree.right(p)?)?))
    }

    fn recompute_height<E>(tree: &mut BalanceableBinaryTree<E>, p: Position) -> Result<()> {
        let (left, right) = Self::child_heights(tree, p)?;
        tree.set_aux(p, 1 + left.max(right))
    }

    fn is_balanced<E>(tree: &BalanceableBinaryTree<E>, p: Position) -> Result<bool> {
        let (left, right) = Self::child_heights(tree, p)?;
        Ok((left - right).abs() <= 1)
    }

    /// Returns a child of `p` at least as tall as the other one.
    ///
    /// Ties go to the left child at the root and otherwise to the child on the same side as `p`
    /// hangs off its own parent, so that a later restructure is a single rotation.
    fn taller_child<E>(tree: &BalanceableBinaryTree<E>, p: Position) -> Result<Position> {
        let left = tree.left(p)?;
        let right = tree.right(p)?;
        let (left_height, right_height) = (Self::height(tree, left)?, Self::height(tree, right)?);
        let side = if left_height > right_height {
            Side::Left
        } else if left_height < right_height {
            Side::Right
        } else {
            tree.child_side(p)?.unwrap_or(Side::Left)
        };
        let child = match side {
            Side::Left => left,
            Side::Right => right,
        };
        child.ok_or(TreeError::IllegalStructure("rebalancing reached a leaf"))
    }

    /// Walks from `p` towards the root, restoring balance and cached heights, and stops as soon as
    /// a node's height comes out unchanged.
    fn rebalance<E>(tree: &mut BalanceableBinaryTree<E>, p: Position) -> Result<()> {
        let mut current = Some(p);
        while let Some(mut p) = current {
            let old_height = tree.aux(p)?;
            if !Self::is_balanced(tree, p)? {
                let child = Self::taller_child(tree, p)?;
                let grandchild = Self::taller_child(tree, child)?;
                debug!(?p, ?grandchild, "imbalance detected, restructuring");
                p = tree.restructure(grandchild)?;
                if let Some(left) = tree.left(p)? {
                    Self::recompute_height(tree, left)?;
                }
                if let Some(right) = tree.right(p)? {
                    Self::recompute_height(tree, right)?;
                }
            }
            Self::recompute_height(tree, p)?;
            let new_height = tree.aux(p)?;
            current = tree.parent(p)?;
            if old_height == new_height {
                break;
            }
        }
        Ok(())
    }
}

impl Rebalance for Avl {
    fn rebalance_insert<E>(&self, tree: &mut BalanceableBinaryTree<E>, p: Position) -> Result<()> {
        Self::rebalance(tree, p)
    }

    fn rebalance_delete<E>(&self, tree: &mut BalanceableBinaryTree<E>, p: Position) -> Result<()> {
        match tree.parent(p)? {
            Some(parent) => Self::rebalance(tree, parent),
            None => Ok(()),
        }
    }
}

impl<K, V, C> TreeMap<K, V, C, Avl> {
    /// Verifies the AVL invariants of the whole tree: every internal node caches
    /// `1 + max(left height, right height)` and its children's heights differ by at most one.
    ///
    /// Meant for tests and debugging; runs in O(n).
    pub fn sanity_check(&self) -> bool {
        let tree = self.tree();
        tree.positions().into_iter().all(|p| {
            let Ok(slot) = tree.element(p) else {
                return false;
            };
            if slot.is_sentinel() {
                return tree.aux(p) == Ok(0);
            }
            match (Avl::child_heights(tree, p), tree.aux(p)) {
                (Ok((left, right)), Ok(height)) => height == 1 + left.max(right) && (left - right).abs() <= 1,
                _ => false,
            }
        })
    }
}
