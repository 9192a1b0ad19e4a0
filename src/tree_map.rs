//! A sorted map stored in a binary search tree with sentinel leaves.
//!
//! Every entry lives at an internal node; every internal node has exactly two children, and the
//! leaves are empty sentinels marking where a search falls off the tree. Even an empty map holds
//! one sentinel as its root, so the tree has `2 * len + 1` nodes at all times.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use tracing::{debug, trace};

use crate::balanceable::BalanceableBinaryTree;
use crate::comparator::{Comparator, NaturalOrder};
use crate::entry::{Entry, Slot};
use crate::error::{Result, TreeError};
use crate::linked_binary_tree::LinkedBinaryTree;
use crate::position::Position;
use crate::raw::{Handle, Side};
use crate::rebalance::{Rebalance, Unbalanced};

/// An ordered map over a binary search tree.
///
/// Keys are ordered by a [`Comparator`] (the key type's own ordering by default), and the tree is
/// kept in shape by a [`Rebalance`] strategy: [`Unbalanced`] leaves it a plain binary search tree,
/// [`Avl`](crate::Avl) keeps it height-balanced (see [`AvlTreeMap`](crate::AvlTreeMap)).
///
/// Operations that take a key fail with [`TreeError::IncompatibleKey`] when the comparator cannot
/// order it, before anything is modified.
///
/// # Examples
///
/// ```
/// use avl_tree_map::TreeMap;
///
/// let mut map: TreeMap<u32, &str> = TreeMap::new();
/// map.put(5, "five")?;
/// map.put(3, "three")?;
/// map.put(8, "eight")?;
///
/// assert_eq!(map.get(&3)?, Some(&"three"));
/// assert_eq!(map.put(3, "drei")?, Some("three"));
/// assert_eq!(map.floor_entry(&7)?.map(|e| *e.key()), Some(5));
/// assert_eq!(map.remove(&5)?, Some("five"));
///
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, [3, 8]);
/// # Ok::<(), avl_tree_map::TreeError>(())
/// ```
#[derive(Clone)]
pub struct TreeMap<K, V, C = NaturalOrder, R = Unbalanced> {
    tree: BalanceableBinaryTree<Slot<K, V>>,
    comparator: C,
    rebalancer: R,
}

impl<K, V, R: Rebalance + Default> TreeMap<K, V, NaturalOrder, R> {
    /// Creates an empty map ordered by the key type's [`PartialOrd`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(NaturalOrder, 0)
    }

    /// Creates an empty map with room for `capacity` entries before reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(NaturalOrder, capacity)
    }
}

impl<K, V, C: Comparator<K>, R: Rebalance + Default> TreeMap<K, V, C, R> {
    /// Creates an empty map ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self::from_parts(comparator, 0)
    }

    /// Creates an empty map ordered by `comparator`, with room for `capacity` entries.
    #[must_use]
    pub fn with_comparator_and_capacity(comparator: C, capacity: usize) -> Self {
        Self::from_parts(comparator, capacity)
    }
}

impl<K, V, C, R> TreeMap<K, V, C, R> {
    fn from_parts(comparator: C, capacity: usize) -> Self
    where
        R: Default,
    {
        Self {
            tree: BalanceableBinaryTree::with_root(Slot::Empty, 2 * capacity + 1),
            comparator,
            rebalancer: R::default(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        (self.tree.size() - 1) / 2
    }

    /// Returns the number of entries. Same as [`len`](Self::len).
    #[must_use]
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Returns true if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of entries the map can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity().saturating_sub(1) / 2
    }

    /// Removes every entry, keeping the allocated memory.
    ///
    /// Positions into the old tree become invalid.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.tree.add_root(Slot::Empty).expect("`TreeMap::clear()` - cleared tree has no root!");
    }

    /// Returns the underlying tree, sentinels included.
    #[must_use]
    pub const fn tree(&self) -> &BalanceableBinaryTree<Slot<K, V>> {
        &self.tree
    }

    #[cfg(test)]
    pub(crate) fn tree_mut(&mut self) -> &mut BalanceableBinaryTree<Slot<K, V>> {
        &mut self.tree
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_entry(&self) -> Option<&Entry<K, V>> {
        self.extreme(self.root(), Side::Left).and_then(|p| self.entry(p))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_entry(&self) -> Option<&Entry<K, V>> {
        self.extreme(self.root(), Side::Right).and_then(|p| self.entry(p))
    }

    /// Returns every entry in ascending key order.
    #[must_use]
    pub fn entries(&self) -> Vec<&Entry<K, V>> {
        self.tree.inorder().into_iter().filter_map(|p| self.entry(p)).collect()
    }

    /// Returns an iterator over the entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map: AvlTreeMap<char, u8> = AvlTreeMap::new();
    /// for (i, c) in "tree".chars().enumerate() {
    ///     map.put(c, i as u8).unwrap();
    /// }
    /// let mut iter = map.iter();
    /// assert_eq!(iter.next(), Some((&'e', &3)));
    /// assert_eq!(iter.next_back(), Some((&'t', &0)));
    /// assert_eq!(iter.len(), 1);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.tree, self.len())
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values, ordered by their keys.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Renders the tree structure, one node per line indented by depth. Sentinels print as `leaf`
    /// and entries are followed by their auxiliary value.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map: AvlTreeMap<i32, char> = AvlTreeMap::new();
    /// map.put(2, 'b')?;
    /// map.put(1, 'a')?;
    /// assert_eq!(
    ///     map.dump().to_string(),
    ///     "<2, b> aux=2\n  <1, a> aux=1\n    leaf\n    leaf\n  leaf\n",
    /// );
    /// # Ok::<(), avl_tree_map::TreeError>(())
    /// ```
    pub fn dump(&self) -> Dump<'_, K, V> {
        Dump { tree: &self.tree }
    }

    // ─── Tree navigation ─────────────────────────────────────────────────────

    fn root(&self) -> Position {
        self.tree.root().expect("`TreeMap::root()` - map always has a sentinel root!")
    }

    fn slot(&self, p: Position) -> &Slot<K, V> {
        self.tree.element(p).expect("`TreeMap::slot()` - position is not live!")
    }

    fn entry(&self, p: Position) -> Option<&Entry<K, V>> {
        self.slot(p).entry()
    }

    fn is_sentinel(&self, p: Position) -> bool {
        self.slot(p).is_sentinel()
    }

    fn child(&self, p: Position, side: Side) -> Position {
        let child = match side {
            Side::Left => self.tree.left(p),
            Side::Right => self.tree.right(p),
        };
        child.ok().flatten().expect("`TreeMap::child()` - internal node is missing a child!")
    }

    /// Returns the internal node furthest towards `side` in the subtree at `p`, or `None` if `p` is
    /// a sentinel.
    fn extreme(&self, mut p: Position, side: Side) -> Option<Position> {
        if self.is_sentinel(p) {
            return None;
        }
        loop {
            let next = self.child(p, side);
            if self.is_sentinel(next) {
                return Some(p);
            }
            p = next;
        }
    }

    /// Climbs from `p` to the first ancestor that holds `p` in its `side` subtree.
    fn ancestor_from(&self, mut p: Position, side: Side) -> Option<Position> {
        loop {
            let parent = self.tree.parent(p).ok().flatten()?;
            if self.tree.child_side(p).ok().flatten() == Some(side) {
                return Some(parent);
            }
            p = parent;
        }
    }

    /// Returns the next entry position after the internal node `p` towards `side`: its in-order
    /// successor for `Side::Right`, its predecessor for `Side::Left`.
    fn neighbour(&self, p: Position, side: Side) -> Option<Position> {
        let child = self.child(p, side);
        if self.is_sentinel(child) {
            self.ancestor_from(p, side.opposite())
        } else {
            self.extreme(child, side.opposite())
        }
    }
}

impl<K, V, C: Comparator<K>, R: Rebalance> TreeMap<K, V, C, R> {
    // ─── Searching ───────────────────────────────────────────────────────────

    fn check_key(&self, key: &K) -> Result<()> {
        match self.comparator.compare(key, key) {
            Some(Ordering::Equal) => Ok(()),
            _ => Err(TreeError::IncompatibleKey),
        }
    }

    fn compare(&self, a: &K, b: &K) -> Result<Ordering> {
        self.comparator.compare(a, b).ok_or(TreeError::IncompatibleKey)
    }

    /// Returns the node holding `key`, or the sentinel where it would be inserted.
    fn tree_search(&self, key: &K) -> Result<Position> {
        self.check_key(key)?;
        let mut p = self.root();
        while let Some(entry) = self.entry(p) {
            p = match self.compare(key, entry.key())? {
                Ordering::Equal => return Ok(p),
                Ordering::Less => self.child(p, Side::Left),
                Ordering::Greater => self.child(p, Side::Right),
            };
        }
        Ok(p)
    }

    // Finds the closest entry to `key` on `side`. An exact hit counts unless `strict`.
    fn closest(&self, key: &K, side: Side, strict: bool) -> Result<Option<Position>> {
        let p = self.tree_search(key)?;
        if self.is_sentinel(p) {
            return Ok(self.ancestor_from(p, side.opposite()));
        }
        Ok(if strict { self.neighbour(p, side) } else { Some(p) })
    }

    // ─── Map operations ──────────────────────────────────────────────────────

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IncompatibleKey`] if the comparator cannot order `key`.
    pub fn get(&self, key: &K) -> Result<Option<&V>> {
        let p = self.tree_search(key)?;
        self.rebalancer.rebalance_access(&self.tree, p);
        Ok(self.entry(p).map(Entry::value))
    }

    /// Returns true if the map holds `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IncompatibleKey`] if the comparator cannot order `key`.
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// An existing entry keeps its node; only the value changes.
    ///
    /// # Errors
    ///
    /// [`TreeError::IncompatibleKey`] if the comparator cannot order `key`; the map is unchanged.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        let p = self.tree_search(&key)?;
        if let Slot::Entry(entry) = self.tree.element_mut(p)? {
            let old = entry.replace_value(value);
            self.rebalancer.rebalance_access(&self.tree, p);
            return Ok(Some(old));
        }

        self.tree.set(p, Slot::Entry(Entry::new(key, value)))?;
        self.tree.add_left(p, Slot::Empty)?;
        self.tree.add_right(p, Slot::Empty)?;
        trace!(?p, "expanded sentinel");
        self.rebalancer.rebalance_insert(&mut self.tree, p)?;
        Ok(None)
    }

    /// Removes `key`, returning its value.
    ///
    /// # Errors
    ///
    /// [`TreeError::IncompatibleKey`] if the comparator cannot order `key`; the map is unchanged.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>> {
        let p = self.tree_search(key)?;
        if self.is_sentinel(p) {
            self.rebalancer.rebalance_access(&self.tree, p);
            return Ok(None);
        }

        // A node with two entry children swaps in its predecessor's entry, and the predecessor's
        // node (whose right child is a sentinel) is spliced out instead.
        let mut target = p;
        let mut relocated = None;
        let left = self.child(p, Side::Left);
        if !self.is_sentinel(left) && !self.is_sentinel(self.child(p, Side::Right)) {
            let predecessor = self
                .extreme(left, Side::Right)
                .expect("`TreeMap::remove()` - internal subtree has a maximum!");
            let moved = self.tree.set(predecessor, Slot::Empty)?;
            relocated = Some(self.tree.set(p, moved)?);
            debug!(from = ?predecessor, to = ?p, "relocated predecessor entry");
            target = predecessor;
        }

        let left = self.child(target, Side::Left);
        let leaf = if self.is_sentinel(left) { left } else { self.child(target, Side::Right) };
        let sibling = self.tree.sibling(leaf)?.expect("`TreeMap::remove()` - sentinel has a sibling!");
        self.tree.remove(leaf)?;
        let spliced = self.tree.remove(target)?;
        self.rebalancer.rebalance_delete(&mut self.tree, sibling)?;

        Ok(relocated.unwrap_or(spliced).into_entry().map(|entry| entry.into_parts().1))
    }

    /// Returns the entry with the least key greater than or equal to `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IncompatibleKey`] if the comparator cannot order `key`.
    pub fn ceiling_entry(&self, key: &K) -> Result<Option<&Entry<K, V>>> {
        Ok(self.closest(key, Side::Right, false)?.and_then(|p| self.entry(p)))
    }

    /// Returns the entry with the greatest key less than or equal to `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IncompatibleKey`] if the comparator cannot order `key`.
    pub fn floor_entry(&self, key: &K) -> Result<Option<&Entry<K, V>>> {
        Ok(self.closest(key, Side::Left, false)?.and_then(|p| self.entry(p)))
    }

    /// Returns the entry with the greatest key strictly less than `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IncompatibleKey`] if the comparator cannot order `key`.
    pub fn lower_entry(&self, key: &K) -> Result<Option<&Entry<K, V>>> {
        Ok(self.closest(key, Side::Left, true)?.and_then(|p| self.entry(p)))
    }

    /// Returns the entry with the least key strictly greater than `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IncompatibleKey`] if the comparator cannot order `key`.
    pub fn higher_entry(&self, key: &K) -> Result<Option<&Entry<K, V>>> {
        Ok(self.closest(key, Side::Right, true)?.and_then(|p| self.entry(p)))
    }

    /// Returns the entries with `from <= key < to` in ascending order.
    ///
    /// The result is empty unless `from` orders before `to`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IncompatibleKey`] if the comparator cannot order `from` or `to`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map: AvlTreeMap<i32, i32> = AvlTreeMap::new();
    /// for key in (0..20).step_by(3) {
    ///     map.put(key, key * key)?;
    /// }
    /// let keys: Vec<_> = map.sub_map(&4, &12)?.into_iter().map(|e| *e.key()).collect();
    /// assert_eq!(keys, [6, 9]);
    /// assert!(map.sub_map(&12, &4)?.is_empty());
    /// # Ok::<(), avl_tree_map::TreeError>(())
    /// ```
    pub fn sub_map(&self, from: &K, to: &K) -> Result<Vec<&Entry<K, V>>> {
        self.check_key(from)?;
        self.check_key(to)?;
        let mut entries = Vec::new();
        if self.compare(from, to)? != Ordering::Less {
            return Ok(entries);
        }
        let mut current = self.closest(from, Side::Right, false)?;
        while let Some(p) = current {
            let Some(entry) = self.entry(p) else {
                break;
            };
            if self.compare(entry.key(), to)? != Ordering::Less {
                break;
            }
            entries.push(entry);
            current = self.neighbour(p, Side::Right);
        }
        Ok(entries)
    }
}

impl<K, V, C: Default, R: Default> Default for TreeMap<K, V, C, R> {
    fn default() -> Self {
        Self::from_parts(C::default(), 0)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, R> fmt::Debug for TreeMap<K, V, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C, R> IntoIterator for &'a TreeMap<K, V, C, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ─── Iterators ───────────────────────────────────────────────────────────────

// Pushes the entry nodes along the `toward` spine starting at `current`.
fn push_spine<K, V>(
    tree: &LinkedBinaryTree<Slot<K, V>>,
    stack: &mut Vec<Handle>,
    mut current: Option<Handle>,
    toward: Side,
) {
    while let Some(handle) = current {
        let node = tree.node(handle);
        if node.element().is_sentinel() {
            break;
        }
        stack.push(handle);
        current = node.child(toward);
    }
}

/// An iterator over the entries of a [`TreeMap`] in ascending key order.
///
/// This `struct` is created by the [`iter`](TreeMap::iter) method on [`TreeMap`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: &'a LinkedBinaryTree<Slot<K, V>>,
    front: Vec<Handle>,
    back: Vec<Handle>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(tree: &'a LinkedBinaryTree<Slot<K, V>>, len: usize) -> Self {
        let root = tree.root().map(Position::handle);
        let mut front = Vec::new();
        let mut back = Vec::new();
        push_spine(tree, &mut front, root, Side::Left);
        push_spine(tree, &mut back, root, Side::Right);
        Self {
            tree,
            front,
            back,
            remaining: len,
        }
    }

    fn step(&mut self, from: Side) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let stack = match from {
            Side::Left => &mut self.front,
            Side::Right => &mut self.back,
        };
        let handle = stack.pop()?;
        let node = tree.node(handle);
        push_spine(tree, stack, node.child(from.opposite()), from);
        self.remaining -= 1;
        node.element().entry().map(|entry| (entry.key(), entry.value()))
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.step(Side::Left)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.step(Side::Right)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

/// An iterator over the keys of a [`TreeMap`] in ascending order.
///
/// This `struct` is created by the [`keys`](TreeMap::keys) method on [`TreeMap`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone, Debug)]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`TreeMap`], ordered by key.
///
/// This `struct` is created by the [`values`](TreeMap::values) method on [`TreeMap`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone, Debug)]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Indented rendering of a map's tree, created by [`TreeMap::dump`].
pub struct Dump<'a, K, V> {
    tree: &'a LinkedBinaryTree<Slot<K, V>>,
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Dump<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack: Vec<(Handle, usize)> = self.tree.root().map(|p| (p.handle(), 0)).into_iter().collect();
        while let Some((handle, depth)) = stack.pop() {
            let node = self.tree.node(handle);
            write!(f, "{:indent$}", "", indent = 2 * depth)?;
            match node.element() {
                Slot::Entry(entry) => writeln!(f, "{entry} aux={}", node.aux())?,
                Slot::Empty => writeln!(f, "leaf")?,
            }
            stack.extend(node.right().map(|h| (h, depth + 1)));
            stack.extend(node.left().map(|h| (h, depth + 1)));
        }
        Ok(())
    }
}

impl<K, V> fmt::Debug for Dump<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dump").field("nodes", &self.tree.size()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparator::{OrderBy, Reversed};
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;
    use alloc::vec;
    use proptest::prelude::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(TreeMap<i32, i32>: Send, Sync, Clone, Default);
    assert_impl_all!(Iter<'static, i32, i32>: Send, Sync, ExactSizeIterator, DoubleEndedIterator);

    fn map_of(keys: &[i32]) -> TreeMap<i32, i32> {
        let mut map = TreeMap::new();
        for &key in keys {
            map.put(key, key * 10).unwrap();
        }
        map
    }

    fn keys<C, R>(map: &TreeMap<i32, i32, C, R>) -> Vec<i32> {
        map.keys().copied().collect()
    }

    // Every entry is greater than everything on its left and less than everything on its right;
    // every entry node has two children and every sentinel none.
    fn assert_search_tree<C, R>(map: &TreeMap<i32, i32, C, R>) {
        let tree = map.tree();
        for p in tree.positions() {
            match tree.element(p).unwrap() {
                Slot::Empty => assert!(tree.is_external(p).unwrap()),
                Slot::Entry(entry) => {
                    assert_eq!(tree.num_children(p).unwrap(), 2);
                    let key = *entry.key();
                    let mut below = tree.left(p).unwrap().into_iter().collect::<Vec<_>>();
                    while let Some(q) = below.pop() {
                        if let Some(e) = tree.element(q).unwrap().entry() {
                            assert!(*e.key() < key);
                        }
                        below.extend(tree.children(q).unwrap());
                    }
                    let mut above = tree.right(p).unwrap().into_iter().collect::<Vec<_>>();
                    while let Some(q) = above.pop() {
                        if let Some(e) = tree.element(q).unwrap().entry() {
                            assert!(*e.key() > key);
                        }
                        above.extend(tree.children(q).unwrap());
                    }
                }
            }
        }
        assert_eq!(map.len(), (tree.size() - 1) / 2);
    }

    #[test]
    fn empty_map() {
        let mut map: TreeMap<i32, i32> = TreeMap::new();
        assert!(map.is_empty());
        assert_eq!(map.tree().size(), 1);
        assert_eq!(map.get(&1), Ok(None));
        assert_eq!(map.first_entry(), None);
        assert_eq!(map.last_entry(), None);
        assert_eq!(map.ceiling_entry(&1), Ok(None));
        assert_eq!(map.floor_entry(&1), Ok(None));
        assert_eq!(map.remove(&1), Ok(None));
        assert_eq!(map.iter().next(), None);
        assert!(map.entries().is_empty());
        assert_eq!(map.dump().to_string(), "leaf\n");
    }

    #[test]
    fn put_get_replace() {
        let mut map = map_of(&[5, 3, 8]);
        assert_eq!(map.get(&3), Ok(Some(&30)));
        assert_eq!(map.contains_key(&4), Ok(false));

        let node = map.tree().inorder()[3];
        assert_eq!(map.put(5, 55), Ok(Some(50)));
        assert_eq!(map.tree().element(node).unwrap().entry().map(Entry::value), Some(&55));
        assert_eq!(map.len(), 3);
        assert_search_tree(&map);
    }

    #[test]
    fn plain_tree_is_unbalanced() {
        let map = map_of(&[1, 2, 3, 4, 5]);
        let root = map.tree().root().unwrap();
        // A right spine of five entries above one final sentinel.
        assert_eq!(map.tree().height(root), Ok(5));
        assert!(map.tree().positions().into_iter().all(|p| map.tree().aux(p) == Ok(0)));
    }

    #[test]
    fn remove_leaf_inner_and_root() {
        let mut map = map_of(&[5, 3, 10, 2, 4, 7, 11, 1, 6, 9, 12, 8]);
        assert_eq!(keys(&map), (1..=12).collect::<Vec<_>>());

        // Two entry children: 4 is copied into the root and its node goes away.
        assert_eq!(map.remove(&5), Ok(Some(50)));
        assert_eq!(map.len(), 11);
        let root = map.tree().root().unwrap();
        assert_eq!(map.tree().element(root).unwrap().entry().map(Entry::key), Some(&4));
        assert_search_tree(&map);

        assert_eq!(map.remove(&12), Ok(Some(120)));
        assert_eq!(map.remove(&7), Ok(Some(70)));
        assert_eq!(map.remove(&7), Ok(None));
        assert_eq!(keys(&map), [1, 2, 3, 4, 6, 8, 9, 10, 11]);
        assert_search_tree(&map);

        for key in [4, 1, 2, 3, 6, 8, 9, 10, 11] {
            assert_eq!(map.remove(&key), Ok(Some(key * 10)));
            assert_search_tree(&map);
        }
        assert!(map.is_empty());
        assert_eq!(map.tree().size(), 1);
    }

    #[test]
    fn removed_positions_go_stale() {
        let mut map = map_of(&[2, 1, 3]);
        let one = map.tree().inorder()[1];
        map.remove(&1).unwrap();
        assert!(!map.tree().contains(one));
        assert_eq!(map.tree().element(one), Err(TreeError::InvalidPosition));
    }

    #[test]
    fn navigation() {
        let map = map_of(&[14, 7, 17, 4, 11, 53, 13]);
        let key = |e: Option<&Entry<i32, i32>>| e.map(|e| *e.key());

        assert_eq!(key(map.first_entry()), Some(4));
        assert_eq!(key(map.last_entry()), Some(53));

        assert_eq!(key(map.ceiling_entry(&12).unwrap()), Some(13));
        assert_eq!(key(map.floor_entry(&12).unwrap()), Some(11));
        assert_eq!(key(map.ceiling_entry(&13).unwrap()), Some(13));
        assert_eq!(key(map.floor_entry(&13).unwrap()), Some(13));
        assert_eq!(key(map.ceiling_entry(&54).unwrap()), None);
        assert_eq!(key(map.floor_entry(&3).unwrap()), None);

        assert_eq!(key(map.higher_entry(&13).unwrap()), Some(14));
        assert_eq!(key(map.lower_entry(&13).unwrap()), Some(11));
        assert_eq!(key(map.higher_entry(&14).unwrap()), Some(17));
        assert_eq!(key(map.lower_entry(&14).unwrap()), Some(13));
        assert_eq!(key(map.higher_entry(&53).unwrap()), None);
        assert_eq!(key(map.lower_entry(&4).unwrap()), None);
        assert_eq!(key(map.higher_entry(&15).unwrap()), Some(17));
        assert_eq!(key(map.lower_entry(&15).unwrap()), Some(14));
    }

    #[test]
    fn sub_map_is_half_open() {
        let map = map_of(&[14, 7, 17, 4, 11, 53, 13]);
        let sub = |from, to| map.sub_map(&from, &to).unwrap().into_iter().map(|e| *e.key()).collect::<Vec<_>>();
        assert_eq!(sub(7, 14), [7, 11, 13]);
        assert_eq!(sub(5, 100), [7, 11, 13, 14, 17, 53]);
        assert_eq!(sub(0, 4), Vec::<i32>::new());
        assert_eq!(sub(14, 14), Vec::<i32>::new());
        assert_eq!(sub(20, 10), Vec::<i32>::new());
    }

    #[test]
    fn incompatible_keys_are_rejected_up_front() {
        let mut map: TreeMap<f64, u8> = TreeMap::new();
        map.put(1.0, 1).unwrap();
        map.put(2.0, 2).unwrap();
        let before = map.tree().size();

        assert_eq!(map.put(f64::NAN, 3), Err(TreeError::IncompatibleKey));
        assert_eq!(map.get(&f64::NAN), Err(TreeError::IncompatibleKey));
        assert_eq!(map.remove(&f64::NAN), Err(TreeError::IncompatibleKey));
        assert_eq!(map.ceiling_entry(&f64::NAN), Err(TreeError::IncompatibleKey));
        assert_eq!(map.sub_map(&0.0, &f64::NAN), Err(TreeError::IncompatibleKey));
        assert_eq!(map.tree().size(), before);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn custom_comparators() {
        let mut map: TreeMap<i32, (), Reversed<NaturalOrder>> = TreeMap::with_comparator(Reversed(NaturalOrder));
        for key in [3, 1, 2] {
            map.put(key, ()).unwrap();
        }
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
        assert_eq!(map.ceiling_entry(&0).unwrap().map(|e| *e.key()), None);

        let by_abs = OrderBy(|a: &i32, b: &i32| a.abs().cmp(&b.abs()));
        let mut map: TreeMap<i32, &str, _> = TreeMap::with_comparator_and_capacity(by_abs, 4);
        map.put(-2, "minus two").unwrap();
        assert_eq!(map.put(2, "two"), Ok(Some("minus two")));
        assert_eq!(map.first_entry().map(|e| *e.key()), Some(-2));
        assert!(map.capacity() >= 4);
    }

    #[test]
    fn clear_and_reuse() {
        let mut map = map_of(&[2, 1, 3]);
        let old_root = map.tree().root().unwrap();
        map.clear();
        assert!(map.is_empty());
        assert!(!map.tree().contains(old_root));
        map.put(9, 90).unwrap();
        assert_eq!(keys(&map), [9]);
    }

    #[test]
    fn clones_are_independent() {
        let mut map = map_of(&[2, 1, 3]);
        let copy = map.clone();
        let root = map.tree().root().unwrap();
        assert_eq!(copy.tree().element(root), Err(TreeError::InvalidPosition));
        map.remove(&2).unwrap();
        assert_eq!(keys(&copy), [1, 2, 3]);
        assert_eq!(keys(&map), [1, 3]);
    }

    #[test]
    fn iterators_meet_in_the_middle() {
        let map = map_of(&[4, 2, 6, 1, 3, 5, 7]);
        let mut iter = map.iter();
        assert_eq!(iter.next(), Some((&1, &10)));
        assert_eq!(iter.next_back(), Some((&7, &70)));
        assert_eq!(iter.next_back(), Some((&6, &60)));
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.clone().map(|(k, _)| *k).collect::<Vec<_>>(), [2, 3, 4, 5]);
        assert_eq!(iter.rev().map(|(k, _)| *k).collect::<Vec<_>>(), [5, 4, 3, 2]);
        assert_eq!(map.values().rev().next(), Some(&70));
        assert_eq!((&map).into_iter().count(), 7);
    }

    #[test]
    fn debug_and_dump() {
        let map = map_of(&[2, 1]);
        assert_eq!(alloc::format!("{map:?}"), "{1: 10, 2: 20}");
        assert_eq!(map.dump().to_string(), "<2, 20> aux=0\n  <1, 10> aux=0\n    leaf\n    leaf\n  leaf\n");
        assert_eq!(map.entries().iter().map(ToString::to_string).collect::<Vec<_>>(), ["<1, 10>", "<2, 20>"]);
    }

    #[test]
    fn default_map_uses_default_comparator() {
        let mut map: TreeMap<&str, i32> = TreeMap::default();
        map.put("b", 2).unwrap();
        map.put("a", 1).unwrap();
        assert_eq!(map.entries().into_iter().map(|e| *e.key()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    proptest! {
        #[test]
        fn matches_btree_map(ops in prop::collection::vec((0u8..3, -50i32..50), 0..300)) {
            let mut map: TreeMap<i32, i32> = TreeMap::new();
            let mut model = BTreeMap::new();
            for (op, key) in ops {
                match op {
                    0 => prop_assert_eq!(map.put(key, key + 1).unwrap(), model.insert(key, key + 1)),
                    1 => prop_assert_eq!(map.remove(&key).unwrap(), model.remove(&key)),
                    _ => prop_assert_eq!(map.get(&key).unwrap(), model.get(&key)),
                }
                prop_assert_eq!(map.len(), model.len());
            }
            assert_search_tree(&map);
            prop_assert!(map.iter().eq(model.iter()));
            prop_assert!(map.iter().rev().eq(model.iter().rev()));
        }

        #[test]
        fn neighbours_match_btree_map(keys in prop::collection::btree_set(-100i32..100, 0..60), probe in -110i32..110) {
            let map = map_of(&keys.iter().copied().collect::<Vec<_>>());
            let key = |e: Option<&Entry<i32, i32>>| e.map(|e| *e.key());
            prop_assert_eq!(key(map.ceiling_entry(&probe).unwrap()), keys.range(probe..).next().copied());
            prop_assert_eq!(key(map.higher_entry(&probe).unwrap()), keys.range(probe + 1..).next().copied());
            prop_assert_eq!(key(map.floor_entry(&probe).unwrap()), keys.range(..=probe).next_back().copied());
            prop_assert_eq!(key(map.lower_entry(&probe).unwrap()), keys.range(..probe).next_back().copied());
            let sub: Vec<i32> = map.sub_map(&probe, &(probe + 30)).unwrap().into_iter().map(|e| *e.key()).collect();
            prop_assert_eq!(sub, keys.range(probe..probe + 30).copied().collect::<Vec<_>>());
        }
    }
}
