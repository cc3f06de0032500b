use core::fmt::{self, Write};

use super::ScapegoatTree;
use crate::raw::{Handle, RawScapegoatTree};

const INDENT: usize = 4;

impl<K: fmt::Debug, C> ScapegoatTree<K, C> {
    /// Writes a pre-order dump of the tree's nodes to `out`.
    ///
    /// Each node prints its slot number, its key and then its left and right
    /// children, indented four spaces deeper. Missing children print `null`.
    /// The format is meant for people and may change.
    ///
    /// # Errors
    ///
    /// Returns any error reported by `out`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::new(0.75)?;
    /// tree.insert(1);
    ///
    /// let mut dump = String::new();
    /// tree.write_debug_info(&mut dump)?;
    /// assert_eq!(dump, "Node       #0\nKey:       1\nLeft Child:\n    null\nRight Child:\n    null\n");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_debug_info<W: Write>(&self, out: &mut W) -> fmt::Result {
        write_subtree(&self.raw, self.raw.root(), 0, out)
    }

    /// Returns an adapter that formats the dump of
    /// [`write_debug_info`](Self::write_debug_info) through [`Display`](fmt::Display).
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree: ScapegoatTree<&str> = ScapegoatTree::new(0.75)?;
    /// assert_eq!(tree.debug_info().to_string(), "null\n");
    /// # Ok::<(), scapegoat_tree::Error>(())
    /// ```
    pub fn debug_info(&self) -> DebugInfo<'_, K, C> {
        DebugInfo { tree: self }
    }
}

/// Displays a tree's node dump.
///
/// This `struct` is created by [`ScapegoatTree::debug_info`].
#[must_use = "this only formats the dump when displayed"]
pub struct DebugInfo<'a, K, C> {
    tree: &'a ScapegoatTree<K, C>,
}

impl<K: fmt::Debug, C> fmt::Display for DebugInfo<'_, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.write_debug_info(f)
    }
}

fn write_subtree<K: fmt::Debug, C, W: Write>(
    tree: &RawScapegoatTree<K, C>,
    node: Option<Handle>,
    indent: usize,
    out: &mut W,
) -> fmt::Result {
    let Some(handle) = node else {
        return writeln!(out, "{:indent$}null", "");
    };

    let node = tree.node(handle);
    writeln!(out, "{:indent$}Node       {handle:?}", "")?;
    writeln!(out, "{:indent$}Key:       {:?}", "", node.key)?;
    writeln!(out, "{:indent$}Left Child:", "")?;
    write_subtree(tree, node.left(), indent + INDENT, out)?;
    writeln!(out, "{:indent$}Right Child:", "")?;
    write_subtree(tree, node.right(), indent + INDENT, out)
}
