//! A scapegoat tree for Rust.
//!
//! This crate provides [`ScapegoatTree`], an ordered set kept balanced without
//! storing any balance metadata in its nodes: no colors, heights or subtree
//! sizes. Each node is just a key and two child links.
//!
//! Balance is restored lazily. When an insertion lands too deep the tree finds
//! the *scapegoat*, the shallowest ancestor whose subtree is too lopsided, and
//! rebuilds that subtree into a perfectly balanced one in place. When removals
//! shrink the tree far enough below its recent peak, the whole tree is rebuilt.
//!
//! # Example
//!
//! ```
//! use scapegoat_tree::ScapegoatTree;
//!
//! let mut tree = ScapegoatTree::new(0.6)?;
//! for key in 1..=7 {
//!     tree.insert(key);
//! }
//!
//! assert!(tree.search(&4));
//! assert!(!tree.insert(4)); // already present
//! assert!(tree.height().unwrap() <= 3);
//!
//! assert!(tree.remove(&4));
//! assert!(!tree.search(&4));
//! assert!(tree.verify());
//! # Ok::<(), scapegoat_tree::Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Pluggable ordering** - Any [`Comparator`], including plain closures
//! - **Tunable balance** - `alpha` trades rebuild frequency against tree height
//! - **No per-node overhead** - Nodes live in a slot arena and are reused by rebuilds
//!
//! # Implementation
//!
//! Insertions follow Galperin and Rivest: a new leaf deeper than
//! `floor(log_{1/alpha}(len))` proves some ancestor is alpha-weight-unbalanced.
//! Subtree sizes are counted on demand while walking back up the insertion
//! path, and the chosen subtree is flattened into a list threaded through the
//! nodes' right links and rebuilt from it, both in O(size) time without
//! allocating.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod alpha;
mod compare;
mod error;
mod raw;

pub mod scapegoat_tree;

pub use compare::{Comparator, NaturalOrder};
pub use error::{Error, Result};
pub use raw::VerifyReport;
pub use scapegoat_tree::ScapegoatTree;
