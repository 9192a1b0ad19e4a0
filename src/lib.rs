//! Sorted maps over a linked binary search tree, with optional AVL balancing.
//!
//! This crate provides [`TreeMap`], an ordered map stored in a binary search tree whose leaves are
//! empty sentinel nodes, and [`AvlTreeMap`], the same map kept height-balanced by AVL rotations.
//! The trees underneath are usable on their own: [`LinkedBinaryTree`] is a general binary tree
//! addressed through [`Position`] handles, and [`BalanceableBinaryTree`] adds per-node auxiliary
//! data plus rotation and trinode restructuring.
//!
//! # Example
//!
//! ```
//! use avl_tree_map::AvlTreeMap;
//!
//! let mut scores: AvlTreeMap<&str, u32> = AvlTreeMap::new();
//! scores.put("Carol", 92)?;
//! scores.put("Alice", 100)?;
//! scores.put("Bob", 85)?;
//!
//! assert_eq!(scores.get(&"Bob")?, Some(&85));
//! assert_eq!(scores.first_entry().map(|e| *e.key()), Some("Alice"));
//! assert_eq!(scores.higher_entry(&"Bob")?.map(|e| *e.value()), Some(92));
//! assert!(scores.sanity_check());
//! # Ok::<(), avl_tree_map::TreeError>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Pluggable ordering** - Keys are compared through a [`Comparator`], so maps can be ordered
//!   by closures or reversed without wrapping the key type
//! - **Checked positions** - Tree positions are generation-checked arena handles; a position to a
//!   removed node or from another tree is rejected with [`TreeError::InvalidPosition`]
//! - **Pluggable balancing** - The rebalancing strategy is a type parameter ([`Unbalanced`] or
//!   [`Avl`])
//!
//! # Implementation
//!
//! Nodes live in an arena and link to each other by index, so structural edits are index rewrites
//! and no node is ever shared or reference counted. Every map operation searches top-down, edits
//! the tree through the linked-tree primitives, and then hands the touched position to its
//! [`Rebalance`] strategy.
//!
//! Logging goes through `tracing`; the crate installs no subscriber.

#![cfg_attr(not(test), no_std)]
// These forbid rules and lint groups are meant to be very restrictive.
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

mod avl;
mod balanceable;
mod comparator;
mod entry;
mod error;
mod linked_binary_tree;
mod position;
mod raw;
mod rebalance;

pub mod tree_map;

pub use avl::{Avl, AvlTreeMap};
pub use balanceable::BalanceableBinaryTree;
pub use comparator::{Comparator, NaturalOrder, OrderBy, Reversed};
pub use entry::{Entry, Slot};
pub use error::{Result, TreeError};
pub use linked_binary_tree::LinkedBinaryTree;
pub use position::Position;
pub use rebalance::{Rebalance, Unbalanced};
pub use tree_map::TreeMap;
