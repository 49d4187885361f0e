//! # radix-set
//!
//! An in-memory ordered set of byte strings backed by a radix tree
//! (compressed prefix tree). Drop-in alternative to a sorted string set
//! that adds a prefix dimension to the usual set operations: emptiness,
//! cardinality, search, removal, and ranged iteration can all be scoped to
//! a key prefix.
//!
//! ## Example
//!
//! ```rust
//! use radix_set::RadixSet;
//!
//! let mut set = RadixSet::new();
//! set.insert("mahjong");
//! set.insert("mahogany");
//! set.insert("math");
//!
//! assert_eq!(set.len(), 3);
//! assert_eq!(set.prefix_len("mah"), 2);
//!
//! let mah: Vec<_> = set.prefix_iter("mah").collect();
//! assert_eq!(mah, [b"mahjong".to_vec(), b"mahogany".to_vec()]);
//!
//! set.remove_prefix("mah");
//! assert_eq!(set.len(), 1);
//! ```
//!
//! Keys are plain byte sequences compared lexicographically; no text
//! encoding is assumed. Edge labels hold whole byte runs, so every
//! non-branching path is compressed into a single edge, and splits and
//! merges on insertion and removal keep it that way.

#![deny(unsafe_op_in_unsafe_fn)]

mod iter;
mod json;
mod node;
mod set;

pub use iter::{Cursor, Iter};
pub use set::RadixSet;

#[cfg(test)]
mod proptests;
