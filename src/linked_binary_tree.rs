//! A node-linked binary tree addressed through [`Position`]s.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;

use crate::error::{Result, TreeError};
use crate::position::{Position, TreeId};
use crate::raw::{Arena, Handle, Node, Side};

/// A binary tree whose nodes live in an arena and link to each other by index.
///
/// Callers navigate and edit the tree through [`Position`]s. Every operation that accepts a
/// position validates it first and fails with [`TreeError::InvalidPosition`] if it came from
/// another tree or its node has been removed.
///
/// # Examples
///
/// ```
/// use avl_tree_map::LinkedBinaryTree;
///
/// let mut tree = LinkedBinaryTree::new();
/// let root = tree.add_root(12)?;
/// let left = tree.add_left(root, 25)?;
/// tree.add_right(root, 31)?;
/// tree.add_left(left, 58)?;
///
/// let preorder: Vec<_> = tree.preorder().into_iter().map(|p| *tree.element(p).unwrap()).collect();
/// assert_eq!(preorder, [12, 25, 58, 31]);
/// assert_eq!(tree.height(root)?, 2);
/// # Ok::<(), avl_tree_map::TreeError>(())
/// ```
pub struct LinkedBinaryTree<E> {
    id: TreeId,
    nodes: Arena<Node<E>>,
    root: Option<Handle>,
}

impl<E> LinkedBinaryTree<E> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: TreeId::next(),
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates an empty tree with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: TreeId::next(),
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Creates a tree holding only a root storing `element`.
    #[must_use]
    pub fn with_root(element: E) -> Self {
        let mut tree = Self::new();
        tree.root = Some(tree.nodes.alloc(Node::new(element, None)));
        tree
    }

    /// Returns the number of nodes.
    pub const fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes.
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of nodes the tree can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Removes every node. Positions issued before the clear become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Returns true if `p` is a live position of this tree.
    pub fn contains(&self, p: Position) -> bool {
        p.tree() == self.id && self.nodes.is_live(p.handle(), p.generation())
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    /// Returns the root, or `None` for an empty tree.
    pub fn root(&self) -> Option<Position> {
        self.root.map(|h| self.position(h))
    }

    /// Returns the parent of `p`, or `None` if `p` is the root.
    pub fn parent(&self, p: Position) -> Result<Option<Position>> {
        let handle = self.validate(p)?;
        Ok(self.node(handle).parent().map(|h| self.position(h)))
    }

    /// Returns the left child of `p`, if any.
    pub fn left(&self, p: Position) -> Result<Option<Position>> {
        let handle = self.validate(p)?;
        Ok(self.node(handle).left().map(|h| self.position(h)))
    }

    /// Returns the right child of `p`, if any.
    pub fn right(&self, p: Position) -> Result<Option<Position>> {
        let handle = self.validate(p)?;
        Ok(self.node(handle).right().map(|h| self.position(h)))
    }

    /// Returns the other child of `p`'s parent, if any.
    pub fn sibling(&self, p: Position) -> Result<Option<Position>> {
        let handle = self.validate(p)?;
        let Some(parent) = self.node(handle).parent() else {
            return Ok(None);
        };
        let parent = self.node(parent);
        let sibling = match parent.side_of(handle) {
            Some(side) => parent.child(side.opposite()),
            None => None,
        };
        Ok(sibling.map(|h| self.position(h)))
    }

    /// Returns the children of `p`, left before right.
    pub fn children(&self, p: Position) -> Result<SmallVec<[Position; 2]>> {
        let handle = self.validate(p)?;
        let node = self.node(handle);
        Ok(node.left().into_iter().chain(node.right()).map(|h| self.position(h)).collect())
    }

    /// Returns the number of children of `p`.
    pub fn num_children(&self, p: Position) -> Result<usize> {
        let handle = self.validate(p)?;
        Ok(self.node(handle).child_count())
    }

    /// Returns true if `p` has at least one child.
    pub fn is_internal(&self, p: Position) -> Result<bool> {
        Ok(self.num_children(p)? > 0)
    }

    /// Returns true if `p` has no children.
    pub fn is_external(&self, p: Position) -> Result<bool> {
        Ok(self.num_children(p)? == 0)
    }

    /// Returns true if `p` is the root.
    pub fn is_root(&self, p: Position) -> Result<bool> {
        let handle = self.validate(p)?;
        Ok(self.root == Some(handle))
    }

    /// Returns the element stored at `p`.
    pub fn element(&self, p: Position) -> Result<&E> {
        let handle = self.validate(p)?;
        Ok(self.node(handle).element())
    }

    /// Returns the element stored at `p` mutably.
    pub fn element_mut(&mut self, p: Position) -> Result<&mut E> {
        let handle = self.validate(p)?;
        Ok(self.node_mut(handle).element_mut())
    }

    /// Returns the number of ancestors of `p`.
    pub fn depth(&self, p: Position) -> Result<usize> {
        let mut current = self.validate(p)?;
        let mut depth = 0;
        while let Some(parent) = self.node(current).parent() {
            depth += 1;
            current = parent;
        }
        Ok(depth)
    }

    /// Returns the height of the subtree rooted at `p`; a leaf has height 0.
    pub fn height(&self, p: Position) -> Result<usize> {
        let handle = self.validate(p)?;
        let mut height = 0;
        let mut stack: SmallVec<[(Handle, usize); 32]> = SmallVec::new();
        stack.push((handle, 0));
        while let Some((current, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.node(current);
            stack.extend(node.left().into_iter().chain(node.right()).map(|child| (child, depth + 1)));
        }
        Ok(height)
    }

    // ─── Mutators ────────────────────────────────────────────────────────────

    /// Places `element` at the root of an empty tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalStructure`] if the tree already has a root.
    pub fn add_root(&mut self, element: E) -> Result<Position> {
        if self.root.is_some() {
            return Err(TreeError::IllegalStructure("tree already has a root"));
        }
        let handle = self.nodes.alloc(Node::new(element, None));
        self.root = Some(handle);
        Ok(self.position(handle))
    }

    /// Creates a left child of `p` storing `element`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalStructure`] if `p` already has a left child.
    pub fn add_left(&mut self, p: Position, element: E) -> Result<Position> {
        self.add_child(p, Side::Left, element)
    }

    /// Creates a right child of `p` storing `element`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalStructure`] if `p` already has a right child.
    pub fn add_right(&mut self, p: Position, element: E) -> Result<Position> {
        self.add_child(p, Side::Right, element)
    }

    fn add_child(&mut self, p: Position, side: Side, element: E) -> Result<Position> {
        let parent = self.validate(p)?;
        if self.node(parent).child(side).is_some() {
            return Err(TreeError::IllegalStructure(match side {
                Side::Left => "position already has a left child",
                Side::Right => "position already has a right child",
            }));
        }
        let child = self.nodes.alloc(Node::new(element, Some(parent)));
        self.node_mut(parent).set_child(side, Some(child));
        Ok(self.position(child))
    }

    /// Replaces the element at `p`, returning the old one.
    pub fn set(&mut self, p: Position, element: E) -> Result<E> {
        Ok(core::mem::replace(self.element_mut(p)?, element))
    }

    /// Removes the node at `p`, splicing its only child (if any) into its place.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalStructure`] if `p` has two children; the tree is left untouched.
    pub fn remove(&mut self, p: Position) -> Result<E> {
        let handle = self.validate(p)?;
        let node = self.node(handle);
        if node.child_count() == 2 {
            return Err(TreeError::IllegalStructure("cannot remove a node with two children"));
        }
        let child = node.left().or(node.right());
        let parent = node.parent();

        if let Some(child) = child {
            self.node_mut(child).set_parent(parent);
        }
        match parent {
            None => self.root = child,
            Some(parent) => {
                let side = self.side_of(parent, handle);
                self.node_mut(parent).set_child(side, child);
            }
        }
        Ok(self.nodes.take(handle).into_element())
    }

    /// Attaches `left` and `right` as the left and right subtrees of the leaf `p`, leaving both
    /// donor trees empty.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalStructure`] if `p` is not a leaf; nothing is moved.
    pub fn attach(&mut self, p: Position, left: &mut Self, right: &mut Self) -> Result<()> {
        let handle = self.validate(p)?;
        if self.node(handle).child_count() != 0 {
            return Err(TreeError::IllegalStructure("can only attach subtrees to a leaf"));
        }
        self.adopt(handle, Side::Left, left);
        self.adopt(handle, Side::Right, right);
        Ok(())
    }

    // Moves every node of `donor` into this arena, hanging its root off `parent` on `side`.
    fn adopt(&mut self, parent: Handle, side: Side, donor: &mut Self) {
        let Some(donor_root) = donor.root.take() else {
            return;
        };
        let mut pending: Vec<(Handle, Handle, Side)> = Vec::with_capacity(donor.size());
        pending.push((donor_root, parent, side));
        while let Some((old, new_parent, side)) = pending.pop() {
            let node = donor.nodes.take(old);
            let (left, right, aux) = (node.left(), node.right(), node.aux());
            let mut adopted = Node::new(node.into_element(), Some(new_parent));
            adopted.set_aux(aux);
            let new = self.nodes.alloc(adopted);
            self.node_mut(new_parent).set_child(side, Some(new));
            pending.extend(left.map(|l| (l, new, Side::Left)));
            pending.extend(right.map(|r| (r, new, Side::Right)));
        }
        donor.clear();
    }

    // ─── Traversals ──────────────────────────────────────────────────────────

    /// Returns every position in preorder.
    pub fn positions(&self) -> Vec<Position> {
        self.preorder()
    }

    /// Returns every position, each node before its children.
    pub fn preorder(&self) -> Vec<Position> {
        let mut snapshot = Vec::with_capacity(self.size());
        let mut stack: Vec<Handle> = self.root.into_iter().collect();
        while let Some(handle) = stack.pop() {
            snapshot.push(self.position(handle));
            let node = self.node(handle);
            stack.extend(node.right());
            stack.extend(node.left());
        }
        snapshot
    }

    /// Returns every position, each node after its children.
    pub fn postorder(&self) -> Vec<Position> {
        // Node-right-left order, reversed, is left-right-node.
        let mut snapshot = Vec::with_capacity(self.size());
        let mut stack: Vec<Handle> = self.root.into_iter().collect();
        while let Some(handle) = stack.pop() {
            snapshot.push(self.position(handle));
            let node = self.node(handle);
            stack.extend(node.left());
            stack.extend(node.right());
        }
        snapshot.reverse();
        snapshot
    }

    /// Returns every position in symmetric order: left subtree, node, right subtree.
    pub fn inorder(&self) -> Vec<Position> {
        let mut snapshot = Vec::with_capacity(self.size());
        let mut stack: Vec<Handle> = Vec::new();
        let mut current = self.root;
        loop {
            while let Some(handle) = current {
                stack.push(handle);
                current = self.node(handle).left();
            }
            let Some(handle) = stack.pop() else {
                break;
            };
            snapshot.push(self.position(handle));
            current = self.node(handle).right();
        }
        snapshot
    }

    /// Returns every position level by level, left to right.
    pub fn breadth_first(&self) -> Vec<Position> {
        let mut snapshot = Vec::with_capacity(self.size());
        let mut queue: VecDeque<Handle> = self.root.into_iter().collect();
        while let Some(handle) = queue.pop_front() {
            snapshot.push(self.position(handle));
            let node = self.node(handle);
            queue.extend(node.left());
            queue.extend(node.right());
        }
        snapshot
    }

    // ─── Crate-internal linkage ──────────────────────────────────────────────

    /// Resolves `p` to its arena handle.
    pub(crate) fn validate(&self, p: Position) -> Result<Handle> {
        if self.contains(p) {
            Ok(p.handle())
        } else {
            Err(TreeError::InvalidPosition)
        }
    }

    #[inline]
    pub(crate) fn position(&self, handle: Handle) -> Position {
        Position::new(self.id, handle, self.nodes.generation(handle))
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<E> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<E> {
        self.nodes.get_mut(handle)
    }

    pub(crate) fn set_root(&mut self, root: Handle) {
        self.node_mut(root).set_parent(None);
        self.root = Some(root);
    }

    /// Makes `child` the `side` child of `parent`.
    pub(crate) fn relink(&mut self, parent: Handle, child: Option<Handle>, side: Side) {
        if let Some(child) = child {
            self.node_mut(child).set_parent(Some(parent));
        }
        self.node_mut(parent).set_child(side, child);
    }

    /// Returns the side of `parent` that `child` hangs off.
    pub(crate) fn side_of(&self, parent: Handle, child: Handle) -> Side {
        self.node(parent)
            .side_of(child)
            .expect("`LinkedBinaryTree::side_of()` - `child` is not linked to `parent`!")
    }
}

impl<E> Default for LinkedBinaryTree<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A clone is a separate tree: positions issued by one are rejected by the other.
impl<E: Clone> Clone for LinkedBinaryTree<E> {
    fn clone(&self) -> Self {
        Self {
            id: TreeId::next(),
            nodes: self.nodes.clone(),
            root: self.root,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for LinkedBinaryTree<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.preorder().into_iter().map(|p| self.node(p.handle()).element())).finish()
    }
}
