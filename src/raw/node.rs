use super::handle::Handle;

/// Which child link of a parent a node hangs from.
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

/// A binary search tree node: a key and two child links, nothing else.
///
/// During a rebuild the `right` link doubles as the "next" pointer of the
/// flattened list.
#[derive(Clone)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    left: Option<Handle>,
    right: Option<Handle>,
}

impl<K> Node<K> {
    /// Creates a leaf.
    pub(crate) const fn new(key: K) -> Self {
        Self {
            key,
            left: None,
            right: None,
        }
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

    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Returns true if both child links are populated.
    pub(crate) const fn has_two_children(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// The only child of a node with at most one child, or `None` for a leaf.
    pub(crate) const fn sole_child(&self) -> Option<Handle> {
        match self.left {
            Some(left) => Some(left),
            None => self.right,
        }
    }

    /// Returns the side `child` hangs from, if it is a child of this node.
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }
}
