use core::cmp::Ordering;

use super::handle::Handle;
use super::raw_scapegoat_tree::RawScapegoatTree;
use crate::compare::Comparator;

/// Properties of a tree recomputed from scratch by
/// [`ScapegoatTree::verify_report`](crate::ScapegoatTree::verify_report).
///
/// This is a debugging aid; none of it is cached by the tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerifyReport {
    /// The number of keys the tree believes it holds.
    pub len: usize,
    /// The number of nodes actually reachable from the root.
    pub counted: usize,
    /// Height in edges, `None` for an empty tree.
    pub height: Option<usize>,
    /// Every key sorts strictly after all of its left descendants and
    /// strictly before all of its right descendants.
    pub ordered: bool,
    /// The tree is loosely alpha-height balanced:
    /// `height <= floor(log_{1/alpha}(counted)) + 1`.
    pub height_balanced: bool,
    /// `len >= alpha * max_size`, i.e. removals have not yet outrun the
    /// last full rebuild.
    pub weight_balanced: bool,
}

impl VerifyReport {
    /// Returns true if every checked property holds.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.len == self.counted && self.ordered && self.height_balanced && self.weight_balanced
    }
}

/// Size, height and ordering of one subtree.
struct Subtree {
    size: usize,
    height: Option<usize>,
    ordered: bool,
}

impl<K, C: Comparator<K>> RawScapegoatTree<K, C> {
    /// Recomputes the size, height and ordering of the whole tree.
    pub(crate) fn verify_report(&self) -> VerifyReport {
        let root = self.check_subtree(self.root(), None, None);
        let alpha = self.alpha();
        let height_balanced = root
            .height
            .is_none_or(|height| height <= alpha.deep_height(root.size) + 1);

        VerifyReport {
            len: self.len(),
            counted: root.size,
            height: root.height,
            ordered: root.ordered,
            height_balanced,
            weight_balanced: alpha.retains_weight(self.len(), self.max_size()),
        }
    }

    /// Returns true if the tree is ordered, loosely alpha-height balanced, and
    /// has not shrunk below `alpha * max_size`.
    pub(crate) fn verify(&self) -> bool {
        self.verify_report().is_valid()
    }

    /// Checks the subtree at `node` given that all of its keys must sort
    /// strictly between `lower` and `upper`.
    fn check_subtree(&self, node: Option<Handle>, lower: Option<&K>, upper: Option<&K>) -> Subtree {
        let Some(handle) = node else {
            return Subtree {
                size: 0,
                height: None,
                ordered: true,
            };
        };

        let node = self.node(handle);
        let comparator = self.comparator();
        let above_lower = lower.is_none_or(|lower| comparator.compare(lower, &node.key) == Ordering::Less);
        let below_upper = upper.is_none_or(|upper| comparator.compare(&node.key, upper) == Ordering::Less);

        let left = self.check_subtree(node.left(), lower, Some(&node.key));
        let right = self.check_subtree(node.right(), Some(&node.key), upper);

        Subtree {
            size: left.size + right.size + 1,
            height: Some(left.height.max(right.height).map_or(0, |height| height + 1)),
            ordered: above_lower && below_upper && left.ordered && right.ordered,
        }
    }
}
