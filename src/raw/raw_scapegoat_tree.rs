use core::cmp::Ordering;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use crate::alpha::Alpha;
use crate::compare::Comparator;

/// The core scapegoat tree backing `ScapegoatTree`.
#[derive(Clone)]
pub(crate) struct RawScapegoatTree<K, C> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of live keys.
    size: usize,
    /// Largest `size` since the whole tree was last rebuilt.
    max_size: usize,
    alpha: Alpha,
    /// Whether the next two-child removal pulls up the successor (else the predecessor).
    replace_with_successor: bool,
    comparator: C,
}

/// Ancestors of an insertion point, root first.
///
/// An empty path stands for the root's (absent) parent.
type Path = SmallVec<[Handle; 32]>;

/// The root of an alpha-weight-unbalanced subtree, found on an insertion path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Scapegoat {
    /// Root of the subtree to rebuild.
    pub(crate) node: Handle,
    /// Parent of `node`; `None` when `node` is the tree root.
    pub(crate) parent: Option<Handle>,
    /// Number of nodes in the subtree rooted at `node`.
    pub(crate) size: usize,
}

impl<K, C> RawScapegoatTree<K, C> {
    /// Creates a new, empty tree.
    pub(crate) const fn new(alpha: Alpha, comparator: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            size: 0,
            max_size: 0,
            alpha,
            replace_with_successor: true,
            comparator,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(alpha: Alpha, comparator: C, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            ..Self::new(alpha, comparator)
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.size
    }

    pub(crate) const fn max_size(&self) -> usize {
        self.max_size
    }

    pub(crate) const fn alpha(&self) -> Alpha {
        self.alpha
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K> {
        self.nodes.get_mut(handle)
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Removes every key. The successor/predecessor alternation restarts too.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.size = 0;
        self.max_size = 0;
        self.replace_with_successor = true;
    }

    /// Counts the nodes below and including `node` by walking them all.
    pub(crate) fn subtree_size(&self, node: Option<Handle>) -> usize {
        node.map_or(0, |handle| {
            let node = self.nodes.get(handle);
            1 + self.subtree_size(node.left()) + self.subtree_size(node.right())
        })
    }

    /// Height of the subtree at `node` in edges; `None` for an empty subtree.
    pub(crate) fn subtree_height(&self, node: Option<Handle>) -> Option<usize> {
        let handle = node?;
        let node = self.nodes.get(handle);
        let below = self.subtree_height(node.left()).max(self.subtree_height(node.right()));
        Some(below.map_or(0, |height| height + 1))
    }

    /// Points the link that currently holds `old` (a child of `parent`, or the
    /// root slot when `parent` is `None`) at `new`.
    fn replace_link(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let parent = self.nodes.get_mut(parent);
                let side = parent
                    .side_of(old)
                    .expect("`RawScapegoatTree::replace_link()` - `old` is not a child of `parent`!");
                parent.set_child(side, new);
            }
        }
    }

    /// Walks the insertion path upwards and returns the shallowest ancestor
    /// whose index on the path exceeds the alpha-deep height of its subtree.
    ///
    /// `path` holds the ancestors of a just-inserted node, root first, and
    /// must contain at least one entry. It is consumed.
    pub(crate) fn find_scapegoat(&self, path: &mut Path) -> Scapegoat {
        let mut node = path
            .pop()
            .expect("`RawScapegoatTree::find_scapegoat()` - insertion path is empty!");
        let mut parent = path.pop();
        let mut size = self.subtree_size(Some(node));
        let mut index = 1;

        while let Some(ancestor) = parent {
            if index > self.alpha.deep_height(size) {
                break;
            }

            // Only the sibling subtree is new; `node`'s own subtree is already counted.
            let ancestor_node = self.nodes.get(ancestor);
            let sibling = if ancestor_node.left() == Some(node) {
                ancestor_node.right()
            } else {
                ancestor_node.left()
            };
            size += 1 + self.subtree_size(sibling);

            node = ancestor;
            parent = path.pop();
            index += 1;
        }

        tracing::trace!(scapegoat = ?node, size, depth_from_insert = index, "found scapegoat");
        Scapegoat { node, parent, size }
    }

    /// Rebuilds the scapegoat's subtree into a perfectly weight-balanced one,
    /// reusing its nodes, and links it back where the scapegoat was.
    ///
    /// Reaching the root resets `max_size` to `size`.
    pub(crate) fn rebuild(&mut self, scapegoat: Scapegoat) {
        let Scapegoat { node, parent, size } = scapegoat;

        let list = self.flatten(Some(node), None);
        let (subtree, rest) = self.build_tree(size, list);
        debug_assert!(rest.is_none(), "rebuild consumed fewer nodes than the subtree holds");

        self.replace_link(parent, node, subtree);
        if parent.is_none() {
            self.max_size = self.size;
        }

        tracing::trace!(size, at_root = parent.is_none(), "rebuilt subtree");
    }

    /// Rebuilds the entire tree. Used when removals shrink it to `alpha * max_size`.
    fn rebuild_root(&mut self) {
        tracing::trace!(size = self.size, max_size = self.max_size, "tree shrank, rebuilding from the root");
        match self.root {
            Some(root) => self.rebuild(Scapegoat {
                node: root,
                parent: None,
                size: self.size,
            }),
            None => self.max_size = 0,
        }
    }

    /// Threads the subtree at `root` into an in-order list linked through
    /// `right`, ahead of `head`, and returns the new head.
    ///
    /// Left links are left stale; `build_tree` overwrites them. Uses stack
    /// proportional to the number of right turns on the deepest path.
    fn flatten(&mut self, mut root: Option<Handle>, mut head: Option<Handle>) -> Option<Handle> {
        while let Some(handle) = root {
            let (left, right) = {
                let node = self.nodes.get(handle);
                (node.left(), node.right())
            };
            let rest = self.flatten(right, head);
            self.nodes.get_mut(handle).set_right(rest);
            head = Some(handle);
            root = left;
        }
        head
    }

    /// Turns the first `size` nodes of the list at `head` into a balanced tree.
    ///
    /// Returns the tree's root and the first unconsumed list node. The left
    /// half gets `ceil((size - 1) / 2)` nodes and the right half the rest, so
    /// sibling subtree sizes never differ by more than one.
    fn build_tree(&mut self, size: usize, head: Option<Handle>) -> (Option<Handle>, Option<Handle>) {
        if size == 0 {
            return (None, head);
        }

        let (left, middle) = self.build_tree(size / 2, head);
        let middle = middle.expect("`RawScapegoatTree::build_tree()` - list is shorter than `size`!");
        let next = self.nodes.get(middle).right();
        let (right, rest) = self.build_tree((size - 1) / 2, next);

        let node = self.nodes.get_mut(middle);
        node.set_left(left);
        node.set_right(right);
        (Some(middle), rest)
    }

    /// Unlinks the in-order successor (or predecessor) of `node`, which must
    /// have two children, and moves its key into `node`. The old key of
    /// `node` is returned.
    fn remove_with_two_children(&mut self, node: Handle) -> K {
        // Successor: one step right, then left as far as possible.
        let side = if self.replace_with_successor {
            Side::Right
        } else {
            Side::Left
        };
        let spine = side.opposite();

        let mut parent = node;
        let mut current = self
            .nodes
            .get(node)
            .child(side)
            .expect("`RawScapegoatTree::remove_with_two_children()` - `node` is missing a child!");
        let mut parent_side = side;
        while let Some(next) = self.nodes.get(current).child(spine) {
            parent = current;
            current = next;
            parent_side = spine;
        }

        // The extremal node has nothing on its spine side; its other child takes its place.
        let extremal = self.nodes.take(current);
        self.nodes.get_mut(parent).set_child(parent_side, extremal.child(side));

        self.replace_with_successor = !self.replace_with_successor;
        core::mem::replace(&mut self.nodes.get_mut(node).key, extremal.key)
    }

    /// Unlinks `node`, which has at most one child, splicing the child into its place.
    fn remove_with_one_child(&mut self, node: Handle, parent: Option<Handle>) -> K {
        let child = self.nodes.get(node).sole_child();
        self.replace_link(parent, node, child);
        self.nodes.take(node).key
    }
}

impl<K, C: Comparator<K>> RawScapegoatTree<K, C> {
    /// Finds the node holding `key`, together with its parent.
    fn find(&self, key: &K) -> Option<(Handle, Option<Handle>)> {
        let mut parent = None;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match self.comparator.compare(key, &node.key) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return Some((handle, parent)),
            }
            parent = Some(handle);
        }

        None
    }

    /// Returns true if the tree holds a key equal to `key`.
    pub(crate) fn search(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts `key`, rebuilding a scapegoat subtree if the new leaf lands
    /// deeper than the alpha-deep height of the tree. Returns false (and
    /// leaves the tree untouched) if an equal key is already present.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        let mut path: Path = SmallVec::new();
        let mut slot = None;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let side = match self.comparator.compare(&key, &node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return false,
            };
            path.push(handle);
            slot = Some(side);
            current = node.child(side);
        }

        let leaf = self.nodes.alloc(Node::new(key));
        match (path.last(), slot) {
            (Some(&parent), Some(side)) => self.nodes.get_mut(parent).set_child(side, Some(leaf)),
            _ => self.root = Some(leaf),
        }

        self.size += 1;
        self.max_size = self.max_size.max(self.size);

        // Galperin and Rivest: a leaf deeper than the alpha-deep height of the
        // tree has an alpha-weight-unbalanced ancestor.
        let depth = path.len();
        if depth >= 1 && depth > self.alpha.deep_height(self.size) {
            let scapegoat = self.find_scapegoat(&mut path);
            self.rebuild(scapegoat);
        }

        true
    }

    /// Removes the key equal to `key` and returns it, rebuilding the whole
    /// tree if it has shrunk to `alpha * max_size` keys or fewer.
    pub(crate) fn remove(&mut self, key: &K) -> Option<K> {
        let (node, parent) = self.find(key)?;

        let removed = if self.nodes.get(node).has_two_children() {
            self.remove_with_two_children(node)
        } else {
            self.remove_with_one_child(node, parent)
        };

        self.size -= 1;
        if self.alpha.has_shrunk(self.size, self.max_size) {
            self.rebuild_root();
        }

        Some(removed)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use crate::compare::NaturalOrder;
    use alloc::collections::BTreeSet;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    type Tree = RawScapegoatTree<i32, NaturalOrder>;

    fn tree(alpha: f64) -> Tree {
        RawScapegoatTree::new(Alpha::new(alpha).unwrap(), NaturalOrder)
    }

    impl<K: Clone, C> RawScapegoatTree<K, C> {
        fn in_order(&self) -> Vec<K> {
            fn walk<K: Clone, C>(tree: &RawScapegoatTree<K, C>, node: Option<Handle>, out: &mut Vec<K>) {
                if let Some(handle) = node {
                    let node = tree.node(handle);
                    walk(tree, node.left(), out);
                    out.push(node.key.clone());
                    walk(tree, node.right(), out);
                }
            }
            let mut out = Vec::new();
            walk(self, self.root, &mut out);
            out
        }

        /// Asserts `|size(left) - size(right)| <= 1` at every node below `node`.
        fn assert_perfectly_balanced(&self, node: Option<Handle>) {
            if let Some(handle) = node {
                let node = self.node(handle);
                let left = self.subtree_size(node.left());
                let right = self.subtree_size(node.right());
                assert!(left.abs_diff(right) <= 1, "children of {handle:?} hold {left} and {right} nodes");
                self.assert_perfectly_balanced(node.left());
                self.assert_perfectly_balanced(node.right());
            }
        }
    }

    impl<K: Clone, C: Comparator<K>> RawScapegoatTree<K, C> {
        /// Checks everything `verify` checks plus bookkeeping only the raw tree can see.
        fn validate_invariants(&self) {
            assert!(self.verify(), "verify() failed: {:?}", self.verify_report());
            assert_eq!(self.nodes.len(), self.size, "arena holds nodes that are not in the tree");
            assert!(self.max_size >= self.size);
        }
    }

    /// Builds a tree of the given shape without going through `insert`: each
    /// key hangs below the previous one.
    fn chain(alpha: f64, keys: &[i32]) -> Tree {
        let mut tree = tree(alpha);
        let mut parent: Option<Handle> = None;
        for &key in keys {
            let handle = tree.nodes.alloc(Node::new(key));
            match parent {
                None => tree.root = Some(handle),
                Some(parent) => {
                    let side = if key < tree.node(parent).key { Side::Left } else { Side::Right };
                    tree.nodes.get_mut(parent).set_child(side, Some(handle));
                }
            }
            parent = Some(handle);
        }
        tree.size = keys.len();
        tree.max_size = keys.len();
        tree
    }

    #[test]
    fn empty_tree() {
        let mut tree = tree(0.6);
        assert!(!tree.search(&1));
        assert_eq!(tree.remove(&1), None);
        assert_eq!(tree.subtree_height(tree.root()), None);
        tree.validate_invariants();
    }

    #[test]
    fn ascending_inserts_stay_shallow() {
        let mut tree = tree(0.6);
        for key in 1..=7 {
            assert!(tree.insert(key));
            tree.validate_invariants();
        }
        assert_eq!(tree.in_order(), (1..=7).collect::<Vec<_>>());
        assert!(tree.subtree_height(tree.root()).unwrap() <= 3);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut tree = tree(0.7);
        assert!(tree.insert(10));
        assert!(!tree.insert(10));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn flatten_threads_keys_in_order() {
        let mut tree = chain(0.75, &[50, 10, 40, 20, 30]);
        let mut current = tree.flatten(tree.root, None);
        let mut keys = Vec::new();
        while let Some(handle) = current {
            keys.push(tree.node(handle).key);
            current = tree.node(handle).right();
        }
        assert_eq!(keys, [10, 20, 30, 40, 50]);
    }

    #[test]
    fn rebuild_of_a_chain_is_perfectly_balanced() {
        for len in 0..40 {
            let keys: Vec<i32> = (0..len).collect();
            let mut tree = chain(0.75, &keys);
            if let Some(root) = tree.root {
                tree.rebuild(Scapegoat {
                    node: root,
                    parent: None,
                    size: keys.len(),
                });
            }
            assert_eq!(tree.in_order(), keys);
            tree.assert_perfectly_balanced(tree.root);
            let expected_height = (usize::BITS - keys.len().leading_zeros()).checked_sub(1).map(|h| h as usize);
            assert_eq!(tree.subtree_height(tree.root), expected_height, "len {len}");
        }
    }

    #[test]
    fn rebuild_below_the_root_keeps_max_size() {
        // 100 -> 1 -> 2 -> ... -> 8, hanging left of the root.
        let mut keys = alloc::vec![100];
        keys.extend(1..=8);
        let mut tree = chain(0.75, &keys);
        tree.max_size = 20;
        let root = tree.root.unwrap();
        let child = tree.node(root).left().unwrap();

        tree.rebuild(Scapegoat {
            node: child,
            parent: Some(root),
            size: 8,
        });

        assert_eq!(tree.root, Some(root));
        assert_eq!(tree.max_size, 20);
        assert_eq!(tree.in_order(), [1, 2, 3, 4, 5, 6, 7, 8, 100]);
        tree.assert_perfectly_balanced(tree.node(root).left());
        assert_eq!(tree.subtree_height(tree.node(root).left()), Some(3));
    }

    #[test]
    fn scapegoat_is_the_shallowest_unbalanced_ancestor() {
        // A right-leaning chain 0 -> 1 -> ... -> 5 with 5 just inserted. Path holds 0..=4.
        let tree = chain(0.6, &[0, 1, 2, 3, 4, 5]);
        let mut path: Path = SmallVec::new();
        let mut current = tree.root;
        while let Some(handle) = current {
            if tree.node(handle).key == 5 {
                break;
            }
            path.push(handle);
            current = tree.node(handle).right();
        }

        // deep(2) = 1 at index 1, deep(3) = 2 at index 2, deep(4) = 2 < index 3.
        let scapegoat = tree.find_scapegoat(&mut path);
        assert_eq!(tree.node(scapegoat.node).key, 2);
        assert_eq!(scapegoat.size, 4);
        assert_eq!(scapegoat.parent.map(|parent| tree.node(parent).key), Some(1));
    }

    #[test]
    fn scapegoat_falls_back_to_the_root() {
        let mut tree = chain(0.75, &[0, 1]);
        let mut path: Path = SmallVec::new();
        path.push(tree.root.unwrap());
        let scapegoat = tree.find_scapegoat(&mut path);
        assert_eq!(scapegoat.node, tree.root.unwrap());
        assert_eq!(scapegoat.parent, None);
        assert_eq!(scapegoat.size, 2);

        tree.rebuild(scapegoat);
        assert_eq!(tree.in_order(), [0, 1]);
    }

    #[test]
    fn two_child_removals_alternate_successor_and_predecessor() {
        let mut tree = tree(0.6);
        for key in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert(key);
        }
        assert_eq!(tree.max_size, 7);

        // Successor first: 5 moves up into the root.
        assert_eq!(tree.remove(&4), Some(4));
        assert_eq!(tree.node(tree.root.unwrap()).key, 5);
        assert!(!tree.replace_with_successor);

        // Then the predecessor: 3 moves up.
        assert_eq!(tree.remove(&5), Some(5));
        assert_eq!(tree.node(tree.root.unwrap()).key, 3);
        assert!(tree.replace_with_successor);

        assert_eq!(tree.in_order(), [1, 2, 3, 6, 7]);
        tree.validate_invariants();
    }

    #[test]
    fn removal_of_a_two_child_node_with_deep_successor() {
        let mut tree = chain(0.75, &[10, 20, 15, 12, 13]);
        tree.nodes.get_mut(tree.root.unwrap()).set_left(None);
        let five = tree.nodes.alloc(Node::new(5));
        tree.nodes.get_mut(tree.root.unwrap()).set_left(Some(five));
        tree.size = 6;
        tree.max_size = 6;

        // Successor of 10 is 12, whose right child 13 takes its place under 15.
        assert_eq!(tree.remove(&10), Some(10));
        assert_eq!(tree.in_order(), [5, 12, 13, 15, 20]);
    }

    #[test]
    fn shrinking_triggers_a_global_rebuild() {
        let mut tree = tree(0.75);
        for key in 0..100 {
            tree.insert(key);
        }
        assert_eq!(tree.max_size, 100);

        for key in 0..24 {
            tree.remove(&key);
            assert_eq!(tree.max_size, 100);
        }
        tree.remove(&24);
        assert_eq!(tree.len(), 75);
        assert_eq!(tree.max_size, 75);
        tree.assert_perfectly_balanced(tree.root);
        tree.validate_invariants();
    }

    #[test]
    fn removing_everything_empties_the_arena() {
        let mut tree = tree(0.8);
        for key in (0..64).rev() {
            tree.insert(key * 7 % 64);
        }
        for key in 0..64 {
            assert_eq!(tree.remove(&key), Some(key));
            tree.validate_invariants();
        }
        assert_eq!(tree.root, None);
        assert_eq!(tree.max_size, 0);
        assert_eq!(tree.nodes.len(), 0);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..500).prop_map(Op::Insert),
            2 => (0i32..500).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_every_operation(
            alpha in 0.51f64..0.99,
            ops in prop::collection::vec(op_strategy(), 0..400),
        ) {
            let mut tree = tree(alpha);
            let mut model = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        prop_assert_eq!(tree.insert(key), model.insert(key));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove(&key).is_some(), model.remove(&key));
                    }
                }
                tree.validate_invariants();
            }

            prop_assert_eq!(tree.in_order(), model.into_iter().collect::<Vec<_>>());
        }

        #[test]
        fn rebuild_preserves_order(keys in prop::collection::btree_set(-1000i32..1000, 1..200)) {
            let mut tree = tree(0.9);
            for &key in &keys {
                tree.insert(key);
            }
            let before = tree.in_order();
            let root = tree.root.unwrap();
            tree.rebuild(Scapegoat { node: root, parent: None, size: tree.size });

            prop_assert_eq!(tree.in_order(), before);
            tree.assert_perfectly_balanced(tree.root);
            prop_assert_eq!(tree.max_size, tree.size);
        }
    }
}
