use super::ScapegoatTree;
use crate::alpha::Alpha;
use crate::compare::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::raw::RawScapegoatTree;

impl<K: Ord> ScapegoatTree<K> {
    /// Creates an empty tree with room for at least `capacity` keys before
    /// its node storage reallocates.
    ///
    /// Rebuilds never allocate, so the capacity only matters for insertions.
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
    /// let tree: ScapegoatTree<i32> = ScapegoatTree::with_capacity(0.7, 16)?;
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 16);
    /// # Ok::<(), scapegoat_tree::Error>(())
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    pub fn with_capacity(alpha: f64, capacity: usize) -> Result<Self> {
        Self::with_capacity_and_comparator(alpha, capacity, NaturalOrder)
    }
}

impl<K, C: Comparator<K>> ScapegoatTree<K, C> {
    /// Creates an empty tree ordered by `comparator` with room for at least
    /// `capacity` keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlpha`](crate::Error::InvalidAlpha) unless
    /// `0.5 < alpha < 1`.
    pub fn with_capacity_and_comparator(alpha: f64, capacity: usize, comparator: C) -> Result<Self> {
        Ok(ScapegoatTree {
            raw: RawScapegoatTree::with_capacity(Alpha::new(alpha)?, comparator, capacity),
        })
    }
}

impl<K, C> ScapegoatTree<K, C> {
    /// Returns the number of keys the tree can hold without reallocating.
    ///
    /// Slots freed by removals are reused before the storage grows.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
