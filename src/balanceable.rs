//! A binary tree with an auxiliary integer per node and rotation primitives.

use core::ops::{Deref, DerefMut};

use tracing::trace;

use crate::error::{Result, TreeError};
use crate::linked_binary_tree::LinkedBinaryTree;
use crate::position::Position;
use crate::raw::Side;

/// A [`LinkedBinaryTree`] specialised for search trees: every node carries an auxiliary `i32`
/// (balancing metadata such as an AVL height) and the tree can be rotated and restructured.
///
/// All [`LinkedBinaryTree`] operations are available through `Deref`.
#[derive(Clone, Debug)]
pub struct BalanceableBinaryTree<E> {
    tree: LinkedBinaryTree<E>,
}

impl<E> BalanceableBinaryTree<E> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: LinkedBinaryTree::new(),
        }
    }

    /// Creates a tree holding only a root storing `element`, with room for `capacity` nodes.
    #[must_use]
    pub fn with_root(element: E, capacity: usize) -> Self {
        let mut tree = LinkedBinaryTree::with_capacity(capacity);
        tree.add_root(element).expect("`BalanceableBinaryTree::with_root()` - fresh tree has a root!");
        Self { tree }
    }

    /// Returns the auxiliary value stored at `p`. Fresh nodes start at 0.
    pub fn aux(&self, p: Position) -> Result<i32> {
        let handle = self.tree.validate(p)?;
        Ok(self.tree.node(handle).aux())
    }

    /// Stores an auxiliary value at `p`.
    pub fn set_aux(&mut self, p: Position, value: i32) -> Result<()> {
        let handle = self.tree.validate(p)?;
        self.tree.node_mut(handle).set_aux(value);
        Ok(())
    }

    /// Rotates `p` above its parent.
    ///
    /// ```text
    ///          b                  a
    ///         / \                / \
    ///        a  t2     <=>     t0   b
    ///       / \                    / \
    ///      t0  t1                 t1  t2
    /// ```
    ///
    /// Only links change; elements and auxiliary values stay with their nodes, and every position
    /// remains valid.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalStructure`] if `p` is the root.
    pub fn rotate(&mut self, p: Position) -> Result<()> {
        let x = self.tree.validate(p)?;
        let y = self
            .tree
            .node(x)
            .parent()
            .ok_or(TreeError::IllegalStructure("cannot rotate the root"))?;

        match self.tree.node(y).parent() {
            None => self.tree.set_root(x),
            Some(z) => {
                let side = self.tree.side_of(z, y);
                self.tree.relink(z, Some(x), side);
            }
        }

        // The subtree between x and y changes hands.
        let side = self.tree.side_of(y, x);
        let inner = self.tree.node(x).child(side.opposite());
        self.tree.relink(y, inner, side);
        self.tree.relink(x, Some(y), side.opposite());

        trace!(?p, ?side, "rotated above parent");
        Ok(())
    }

    /// Performs a trinode restructuring of `x` with its parent and grandparent and returns the
    /// position that ends up on top of the three.
    ///
    /// ```text
    ///     z=a                 z=c           z=a               z=c
    ///    /  \                /  \          /  \              /  \
    ///   t0  y=b             y=b  t3       t0   y=c          y=a  t3
    ///      /  \            /  \               /  \         /  \
    ///     t1  x=c         x=a  t2            x=b  t3      t0   x=b
    ///        /  \        /  \               /  \              /  \
    ///       t2  t3      t0  t1             t1  t2            t1  t2
    ///
    ///                                b
    ///                              /   \
    ///                            a       c
    ///                           / \     / \
    ///                          t0  t1  t2  t3
    /// ```
    ///
    /// When `x` and its parent lean the same way the parent is rotated once; otherwise `x` is
    /// rotated twice. Auxiliary values are not recomputed.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalStructure`] if `x` has no grandparent.
    pub fn restructure(&mut self, x: Position) -> Result<Position> {
        let xh = self.tree.validate(x)?;
        let missing = TreeError::IllegalStructure("restructure needs a grandparent");
        let yh = self.tree.node(xh).parent().ok_or(missing)?;
        let zh = self.tree.node(yh).parent().ok_or(missing)?;

        let x_side = self.tree.side_of(yh, xh);
        let y_side = self.tree.side_of(zh, yh);
        if x_side == y_side {
            let y = self.tree.position(yh);
            self.rotate(y)?;
            trace!(?x, top = ?y, "restructured with a single rotation");
            Ok(y)
        } else {
            self.rotate(x)?;
            self.rotate(x)?;
            trace!(?x, "restructured with a double rotation");
            Ok(x)
        }
    }

    pub(crate) fn child_side(&self, p: Position) -> Result<Option<Side>> {
        let handle = self.tree.validate(p)?;
        Ok(self.tree.node(handle).parent().map(|parent| self.tree.side_of(parent, handle)))
    }
}

impl<E> Default for BalanceableBinaryTree<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Deref for BalanceableBinaryTree<E> {
    type Target = LinkedBinaryTree<E>;

    fn deref(&self) -> &Self::Target {
        &self.tree
    }
}

impl<E> DerefMut for BalanceableBinaryTree<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tree
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    // Inserts `key` into a plain (unbalanced) BST, ignoring duplicates.
    fn insert(tree: &mut BalanceableBinaryTree<i32>, key: i32) {
        let Some(mut current) = tree.root() else {
            tree.add_root(key).unwrap();
            return;
        };
        loop {
            let here = *tree.element(current).unwrap();
            let next = match key.cmp(&here) {
                core::cmp::Ordering::Equal => return,
                core::cmp::Ordering::Less => tree.left(current).unwrap(),
                core::cmp::Ordering::Greater => tree.right(current).unwrap(),
            };
            match next {
                Some(next) => current = next,
                None => {
                    if key < here {
                        tree.add_left(current, key).unwrap();
                    } else {
                        tree.add_right(current, key).unwrap();
                    }
                    return;
                }
            }
        }
    }

    fn build(keys: &[i32]) -> BalanceableBinaryTree<i32> {
        let mut tree = BalanceableBinaryTree::new();
        for &key in keys {
            insert(&mut tree, key);
        }
        tree
    }

    fn inorder(tree: &BalanceableBinaryTree<i32>) -> Vec<i32> {
        tree.inorder().into_iter().map(|p| *tree.element(p).unwrap()).collect()
    }

    fn find(tree: &BalanceableBinaryTree<i32>, key: i32) -> Position {
        tree.positions().into_iter().find(|&p| *tree.element(p).unwrap() == key).unwrap()
    }

    // Every child must point back at its parent.
    fn assert_links(tree: &BalanceableBinaryTree<i32>) {
        for p in tree.positions() {
            for child in tree.children(p).unwrap() {
                assert_eq!(tree.parent(child), Ok(Some(p)));
            }
        }
        if let Some(root) = tree.root() {
            assert_eq!(tree.parent(root), Ok(None));
        }
    }

    #[test]
    fn rotate_right_and_back() {
        let mut tree = build(&[4, 2, 6, 1, 3]);
        let two = find(&tree, 2);
        let four = find(&tree, 4);

        tree.rotate(two).unwrap();
        assert_eq!(tree.root(), Some(two));
        assert_eq!(tree.right(two), Ok(Some(four)));
        assert_eq!(*tree.element(tree.left(four).unwrap().unwrap()).unwrap(), 3);
        assert_links(&tree);

        tree.rotate(four).unwrap();
        assert_eq!(tree.root(), Some(four));
        assert_eq!(inorder(&tree), [1, 2, 3, 4, 6]);
        assert_links(&tree);
    }

    #[test]
    fn rotate_root_is_illegal() {
        let mut tree = build(&[1, 2]);
        let root = tree.root().unwrap();
        assert_eq!(tree.rotate(root), Err(TreeError::IllegalStructure("cannot rotate the root")));
    }

    #[test]
    fn restructure_single_rotation() {
        // z=1, y=2, x=3 all lean right.
        let mut tree = build(&[1, 2, 3]);
        let top = tree.restructure(find(&tree, 3)).unwrap();
        assert_eq!(top, find(&tree, 2));
        assert_eq!(tree.root(), Some(top));
        assert_eq!(tree.height(top), Ok(1));
        assert_links(&tree);
    }

    #[test]
    fn restructure_double_rotation() {
        // z=3, y=1, x=2 zig-zag.
        let mut tree = build(&[3, 1, 2]);
        let x = find(&tree, 2);
        let top = tree.restructure(x).unwrap();
        assert_eq!(top, x);
        assert_eq!(tree.root(), Some(x));
        assert_eq!(inorder(&tree), [1, 2, 3]);
        assert_eq!(tree.height(x), Ok(1));
        assert_links(&tree);
    }

    #[test]
    fn restructure_below_grandparent_relinks() {
        let mut tree = build(&[10, 5, 20, 30, 25]);
        let top = tree.restructure(find(&tree, 25)).unwrap();
        assert_eq!(*tree.element(top).unwrap(), 25);
        assert_eq!(tree.parent(top), Ok(tree.root()));
        assert_eq!(inorder(&tree), [5, 10, 20, 25, 30]);
        assert_links(&tree);
    }

    #[test]
    fn restructure_needs_grandparent() {
        let mut tree = build(&[1, 2]);
        let two = find(&tree, 2);
        assert!(matches!(tree.restructure(two), Err(TreeError::IllegalStructure(_))));
    }

    #[test]
    fn aux_is_per_node_and_survives_rotation() {
        let mut tree = build(&[2, 1]);
        let one = find(&tree, 1);
        let two = find(&tree, 2);
        tree.set_aux(one, 7).unwrap();
        assert_eq!(tree.aux(two), Ok(0));
        tree.rotate(one).unwrap();
        assert_eq!(tree.aux(one), Ok(7));
        assert_eq!(tree.child_side(two), Ok(Some(Side::Right)));
        assert_eq!(tree.child_side(one), Ok(None));
    }

    proptest! {
        #[test]
        fn rotations_preserve_inorder(
            keys in prop::collection::vec(-500i32..500, 1..64),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..32),
        ) {
            let mut tree = build(&keys);
            let expected = inorder(&tree);

            for pick in picks {
                let positions = tree.positions();
                let p = positions[pick.index(positions.len())];
                if tree.parent(p).unwrap().is_none() {
                    continue;
                }
                let has_grandparent = tree.parent(tree.parent(p).unwrap().unwrap()).unwrap().is_some();
                if has_grandparent && pick.index(2) == 0 {
                    tree.restructure(p).unwrap();
                } else {
                    tree.rotate(p).unwrap();
                }
                prop_assert_eq!(inorder(&tree), expected.clone());
                prop_assert_eq!(tree.size(), expected.len());
            }
            assert_links(&tree);
        }
    }
}
