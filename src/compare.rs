use core::cmp::Ordering;

/// A strict total order over keys, injected into a [`ScapegoatTree`](crate::ScapegoatTree).
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator, so custom orders rarely
/// need a named type.
///
/// It is a logic error for a comparator to be inconsistent (e.g. not transitive) or
/// to change its answer for the same pair of keys while they are in a tree. The
/// behavior resulting from such a logic error is not specified but will not be
/// undefined behavior.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::ScapegoatTree;
///
/// let mut tree = ScapegoatTree::with_comparator(0.7, |a: &i32, b: &i32| b.cmp(a)).unwrap();
/// assert!(tree.insert(3));
/// assert!(tree.search(&3));
/// ```
pub trait Comparator<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

/// The key type's own [`Ord`] implementation. This is the default comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}
