use core::fmt;

use crate::alpha::Alpha;
use crate::compare::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::raw::{RawScapegoatTree, VerifyReport};

mod capacity;
mod debug;

pub use debug::DebugInfo;

/// An ordered set of keys kept in a scapegoat tree.
///
/// Nodes carry only a key and two child links. Balance comes from two
/// counters kept on the tree (`len` and `max_size`) and from occasionally
/// rebuilding a subtree into a perfectly balanced one:
///
/// - An insertion that lands deeper than `floor(log_{1/alpha}(len))` walks
///   back up its path to the shallowest alpha-weight-unbalanced ancestor (the
///   *scapegoat*) and rebuilds that ancestor's subtree.
/// - A removal that leaves `len <= alpha * max_size` rebuilds the whole tree.
///
/// `search`, `insert` and `remove` take amortized O(log n) time; a single
/// call can take O(n) when it triggers a rebuild.
///
/// Keys are ordered by a [`Comparator`], [`NaturalOrder`] unless another is
/// given. It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key changes while it is in the tree.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::ScapegoatTree;
///
/// let mut tree = ScapegoatTree::new(0.7)?;
///
/// // Ascending inserts would degenerate a plain BST into a list.
/// for key in 0..1_000 {
///     assert!(tree.insert(key));
/// }
/// assert!(!tree.insert(500));
/// assert!(tree.search(&999));
/// assert!(tree.height().unwrap() < 30);
///
/// assert!(tree.remove(&500));
/// assert!(!tree.search(&500));
/// assert!(tree.verify());
/// # Ok::<(), scapegoat_tree::Error>(())
/// ```
#[derive(Clone)]
pub struct ScapegoatTree<K, C = NaturalOrder> {
    raw: RawScapegoatTree<K, C>,
}

impl<K: Ord> ScapegoatTree<K> {
    /// Creates an empty tree ordered by `K`'s [`Ord`] implementation.
    ///
    /// `alpha` is the weight-balance factor: no child subtree may hold more
    /// than `alpha` of its parent's subtree. Values near 0.5 keep the tree
    /// shallow at the cost of frequent rebuilds; values near 1 rebuild rarely
    /// and tolerate deeper trees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlpha`](crate::Error::InvalidAlpha) unless
    /// `0.5 < alpha < 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::{Error, ScapegoatTree};
    ///
    /// assert!(ScapegoatTree::<u32>::new(0.75).is_ok());
    /// assert_eq!(ScapegoatTree::<u32>::new(0.5).err(), Some(Error::InvalidAlpha(0.5)));
    /// assert_eq!(ScapegoatTree::<u32>::new(1.0).err(), Some(Error::InvalidAlpha(1.0)));
    /// ```
    pub fn new(alpha: f64) -> Result<Self> {
        Self::with_comparator(alpha, NaturalOrder)
    }
}

impl<K, C: Comparator<K>> ScapegoatTree<K, C> {
    /// Creates an empty tree ordered by `comparator`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlpha`](crate::Error::InvalidAlpha) unless
    /// `0.5 < alpha < 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// // Case-insensitive keys.
    /// let mut tree = ScapegoatTree::with_comparator(0.6, |a: &&str, b: &&str| {
    ///     a.to_lowercase().cmp(&b.to_lowercase())
    /// })?;
    /// assert!(tree.insert("Goat"));
    /// assert!(!tree.insert("goat"));
    /// assert!(tree.search(&"GOAT"));
    /// # Ok::<(), scapegoat_tree::Error>(())
    /// ```
    pub fn with_comparator(alpha: f64, comparator: C) -> Result<Self> {
        Ok(ScapegoatTree {
            raw: RawScapegoatTree::new(Alpha::new(alpha)?, comparator),
        })
    }

    /// Returns `true` if the tree holds a key equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn search(&self, key: &K) -> bool {
        self.raw.search(key)
    }

    /// Adds `key` to the tree.
    ///
    /// Returns whether the key was newly inserted. If an equal key is already
    /// present nothing changes and `false` is returned.
    ///
    /// # Complexity
    ///
    /// Amortized O(log n), worst case O(n) when a scapegoat subtree is rebuilt.
    pub fn insert(&mut self, key: K) -> bool {
        self.raw.insert(key)
    }

    /// Removes the key equal to `key`, returning whether one was present.
    ///
    /// A node with two children keeps its place and takes over the key of its
    /// in-order successor or predecessor, alternating between the two on
    /// consecutive calls.
    ///
    /// # Complexity
    ///
    /// Amortized O(log n), worst case O(n) when the whole tree is rebuilt.
    pub fn remove(&mut self, key: &K) -> bool {
        self.raw.remove(key).is_some()
    }

    /// Removes the key equal to `key` and returns the stored key, if any.
    ///
    /// This is an extension for keys that carry data beyond what the
    /// comparator looks at.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let by_id = |a: &(u32, char), b: &(u32, char)| a.0.cmp(&b.0);
    /// let mut tree = ScapegoatTree::with_comparator(0.7, by_id)?;
    /// tree.insert((7, 's'));
    /// assert_eq!(tree.take(&(7, '?')), Some((7, 's')));
    /// assert_eq!(tree.take(&(7, '?')), None);
    /// # Ok::<(), scapegoat_tree::Error>(())
    /// ```
    pub fn take(&mut self, key: &K) -> Option<K> {
        self.raw.remove(key)
    }

    /// Returns `true` if the tree is a binary search tree under its
    /// comparator, is loosely alpha-height balanced, and has not shrunk below
    /// `alpha * max_size`.
    ///
    /// This recomputes everything from scratch and is meant for tests and
    /// debugging.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn verify(&self) -> bool {
        self.raw.verify()
    }

    /// Returns the individual properties [`verify`](Self::verify) checks.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree: ScapegoatTree<u8> = (1..=7).fold(ScapegoatTree::new(0.6)?, |mut tree, key| {
    ///     tree.insert(key);
    ///     tree
    /// });
    /// let report = tree.verify_report();
    /// assert_eq!(report.counted, 7);
    /// assert!(report.height.unwrap() <= 3);
    /// assert!(report.is_valid());
    /// # Ok::<(), scapegoat_tree::Error>(())
    /// ```
    #[must_use]
    pub fn verify_report(&self) -> VerifyReport {
        self.raw.verify_report()
    }
}

impl<K, C> ScapegoatTree<K, C> {
    /// Returns the number of keys in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the weight-balance factor the tree was created with.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.raw.alpha().get()
    }

    /// Returns the largest `len` reached since the whole tree was last rebuilt.
    ///
    /// Once removals bring `len` down to `alpha * max_size` the tree is
    /// rebuilt from the root and `max_size` drops back to `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree: ScapegoatTree<i32> = ScapegoatTree::new(0.75)?;
    /// tree.extend(0..100);
    /// assert_eq!(tree.max_size(), 100);
    ///
    /// for key in 0..25 {
    ///     tree.remove(&key);
    /// }
    /// assert_eq!(tree.len(), 75);
    /// assert_eq!(tree.max_size(), 75);
    /// # Ok::<(), scapegoat_tree::Error>(())
    /// ```
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.raw.max_size()
    }

    /// Returns the height of the tree in edges, or `None` if it is empty.
    ///
    /// # Complexity
    ///
    /// O(n); heights are not stored.
    #[must_use]
    pub fn height(&self) -> Option<usize> {
        self.raw.subtree_height(self.raw.root())
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the tree's comparator.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.raw.comparator()
    }
}

impl<K, C: Comparator<K>> Extend<K> for ScapegoatTree<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: Copy + 'a, C: Comparator<K>> Extend<&'a K> for ScapegoatTree<K, C> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<K, C> fmt::Debug for ScapegoatTree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScapegoatTree")
            .field("alpha", &self.alpha())
            .field("len", &self.len())
            .field("max_size", &self.max_size())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::Error;
    use alloc::format;

    #[test]
    fn debug_shows_counters_only() {
        let mut tree: ScapegoatTree<i32> = ScapegoatTree::new(0.75).unwrap();
        tree.extend([3, 1, 2]);
        assert_eq!(
            format!("{tree:?}"),
            "ScapegoatTree { alpha: 0.75, len: 3, max_size: 3, .. }"
        );
    }

    #[test]
    fn construction_validates_alpha() {
        assert_eq!(ScapegoatTree::<i32>::new(0.5).err(), Some(Error::InvalidAlpha(0.5)));
        assert_eq!(ScapegoatTree::<i32>::new(1.0).err(), Some(Error::InvalidAlpha(1.0)));
        assert!(ScapegoatTree::<i32>::new(0.75).is_ok());
    }

    #[test]
    fn clear_resets_counters() {
        let mut tree: ScapegoatTree<i32> = ScapegoatTree::new(0.6).unwrap();
        tree.extend(&[5, 4, 3, 2, 1]);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.max_size(), 0);
        assert_eq!(tree.height(), None);
        assert!(tree.insert(4));
        assert!(tree.verify());
    }
}
