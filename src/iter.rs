//! Cursors and key iteration.
//!
//! A [`Cursor`] is a constant bidirectional position: either a vertex of the
//! tree or the one-past-the-end sentinel. [`Iter`] drives a pair of cursors
//! to yield keys in lexicographic order, forwards or backwards, over the
//! whole set or a prefix-scoped range. Both borrow the set, so any mutation
//! of the container ends their lifetime at compile time.

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;

use crate::json;
use crate::node::Node;

/// A position inside a [`RadixSet`](crate::RadixSet).
///
/// Dereference with [`key`](Cursor::key); step with
/// [`move_next`](Cursor::move_next) and [`move_prev`](Cursor::move_prev).
/// Stepping past the last key parks the cursor at the end position, and
/// stepping backwards from the end position lands on the set's last key.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    root: &'a Node,
    node: Option<&'a Node>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(root: &'a Node, node: Option<&'a Node>) -> Cursor<'a> {
        Cursor { root, node }
    }

    /// The key at this position, or `None` at the end position.
    pub fn key(&self) -> Option<Vec<u8>> {
        self.node.map(Node::key)
    }

    /// Whether this cursor sits at the one-past-the-end position.
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Advance to the next key in lexicographic order. A vertex's subtree
    /// holds its in-order successors, so descend first and only then walk
    /// over to the next branch. No-op at the end position.
    pub fn move_next(&mut self) {
        if let Some(node) = self.node {
            self.node = if node.children.is_empty() {
                node.next_node()
            } else {
                node.first_key()
            };
        }
    }

    /// Step back to the previous key. Stepping back from the first key
    /// parks the cursor at the end position; stepping back from the end
    /// position lands on the last key of the whole set.
    pub fn move_prev(&mut self) {
        self.node = match self.node {
            Some(node) => node.prev_node(),
            None if !self.root.children.is_empty() => self.root.last_key(),
            None if self.root.is_end => Some(self.root),
            None => None,
        };
    }

    /// Serialize the subtree below this position; see
    /// [`RadixSet::to_json`](crate::RadixSet::to_json) for the format. The
    /// end position serializes to `{}`.
    pub fn to_json(&self, include_ends: bool) -> String {
        match self.node {
            Some(node) => json::subtree_to_json(node, include_ends),
            None => String::from("{}"),
        }
    }
}

/// Cursors compare by the identity of the vertex they reference, within the
/// same tree; all end positions of a tree are equal.
impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Cursor<'_>) -> bool {
        ptr::eq::<Node>(self.root, other.root)
            && match (self.node, other.node) {
                (Some(a), Some(b)) => ptr::eq::<Node>(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Eq for Cursor<'_> {}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(node) => f
                .debug_tuple("Cursor")
                .field(&String::from_utf8_lossy(&node.key()))
                .finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

/// An iterator over the keys of a [`RadixSet`](crate::RadixSet), in
/// lexicographic order. Returned by
/// [`iter`](crate::RadixSet::iter) and
/// [`prefix_iter`](crate::RadixSet::prefix_iter).
#[derive(Clone)]
pub struct Iter<'a> {
    front: Cursor<'a>,
    back: Cursor<'a>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(front: Cursor<'a>, back: Cursor<'a>) -> Iter<'a> {
        Iter { front, back }
    }
}

impl Iterator for Iter<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.front.is_end() || self.front == self.back {
            return None;
        }
        let key = self.front.key();
        self.front.move_next();
        key
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Vec<u8>> {
        if self.front.is_end() || self.front == self.back {
            return None;
        }
        self.back.move_prev();
        self.back.key()
    }
}

impl FusedIterator for Iter<'_> {}
