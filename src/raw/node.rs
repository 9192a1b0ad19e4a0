use super::handle::Handle;

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// A binary tree node: one element, arena links to its relatives, and an auxiliary integer that
// balancing strategies may use (AVL stores the subtree height there).
#[derive(Clone)]
pub(crate) struct Node<E> {
    element: E,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
    aux: i32,
}

impl<E> Node<E> {
    /// Creates a childless node under `parent`.
    pub(crate) const fn new(element: E, parent: Option<Handle>) -> Self {
        Self {
            element,
            parent,
            left: None,
            right: None,
            aux: 0,
        }
    }

    #[inline]
    pub(crate) const fn element(&self) -> &E {
        &self.element
    }

    #[inline]
    pub(crate) const fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    pub(crate) fn into_element(self) -> E {
        self.element
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) const fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) const fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Returns the side on which `child` hangs off this node, if it is a child at all.
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Returns the number of children (0, 1 or 2).
    pub(crate) fn child_count(&self) -> usize {
        usize::from(self.left.is_some()) + usize::from(self.right.is_some())
    }

    #[inline]
    pub(crate) const fn aux(&self) -> i32 {
        self.aux
    }

    pub(crate) const fn set_aux(&mut self, aux: i32) {
        self.aux = aux;
    }
}
