//! The public container: an ordered set of byte strings with prefix-scoped
//! queries, backed by a path-compressed radix tree.

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::ptr::NonNull;

use crate::iter::{Cursor, Iter};
use crate::json;
use crate::node::Node;

/// An ordered set of byte strings backed by a radix tree.
///
/// Keys are arbitrary byte sequences compared lexicographically; the empty
/// key is a valid member. Beyond the usual set operations, emptiness,
/// cardinality, search, removal, and iteration can all be scoped to a key
/// prefix, each in time proportional to the prefix rather than to the number
/// of matching keys (plus output size where output is produced).
///
/// ```
/// use radix_set::RadixSet;
///
/// let mut set = RadixSet::new();
/// set.insert("compute");
/// set.insert("computer");
/// set.insert("corn");
///
/// assert_eq!(set.len(), 3);
/// assert_eq!(set.prefix_len("comp"), 2);
/// assert!(set.contains("corn"));
///
/// let keys: Vec<_> = set.prefix_iter("comp").collect();
/// assert_eq!(keys, [b"compute".to_vec(), b"computer".to_vec()]);
/// ```
pub struct RadixSet {
    root: Box<Node>,
    len: usize,
}

impl RadixSet {
    /// Create an empty set.
    pub fn new() -> RadixSet {
        RadixSet {
            root: Box::new(Node::new(false, None)),
            len: 0,
        }
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of keys that start with `prefix`. The empty prefix counts
    /// every key.
    pub fn prefix_len(&self, prefix: impl AsRef<[u8]>) -> usize {
        let mut rest = prefix.as_ref();
        self.root.prefix_match(&mut rest).map_or(0, Node::key_count)
    }

    /// Whether any key starts with `prefix`.
    pub fn contains_prefix(&self, prefix: impl AsRef<[u8]>) -> bool {
        let mut rest = prefix.as_ref();
        match self.root.prefix_match(&mut rest) {
            Some(node) => node.is_end || !node.children.is_empty(),
            None => false,
        }
    }

    /// Whether `key` is in the set.
    pub fn contains(&self, key: impl AsRef<[u8]>) -> bool {
        self.root.exact_match(key.as_ref()).is_some()
    }

    /// Cursor at `key`, or at the end position when absent.
    pub fn find(&self, key: impl AsRef<[u8]>) -> Cursor<'_> {
        Cursor::new(&self.root, self.root.exact_match(key.as_ref()))
    }

    /// Cursor at the smallest key starting with `prefix`, or at the end
    /// position when no key does.
    pub fn find_prefix(&self, prefix: impl AsRef<[u8]>) -> Cursor<'_> {
        let mut rest = prefix.as_ref();
        let node = self
            .root
            .prefix_match(&mut rest)
            .and_then(|stop| if stop.is_end { Some(stop) } else { stop.first_key() });
        Cursor::new(&self.root, node)
    }

    /// Cursor one past the largest key starting with `prefix`: the first
    /// key after the prefix range, or the end position when the range runs
    /// to the end of the set. Forms a half-open range together with
    /// [`find_prefix`](RadixSet::find_prefix).
    pub fn prefix_end(&self, prefix: impl AsRef<[u8]>) -> Cursor<'_> {
        Cursor::new(&self.root, self.prefix_end_node(prefix.as_ref()))
    }

    fn prefix_end_node(&self, prefix: &[u8]) -> Option<&Node> {
        let mut rest = prefix;
        let stop = self.root.approximate_match(&mut rest);
        // A fully consumed prefix names `stop` itself, whose whole subtree
        // is in range.
        if rest.is_empty() {
            return stop.next_node();
        }
        // A child label extending the residual roots the range; step past
        // that child's subtree.
        if let Some((_, child)) = stop
            .children
            .iter()
            .find(|&(label, _)| label.starts_with(rest))
        {
            return child.next_node();
        }
        // Otherwise nothing carries the prefix and the first child sorting
        // after the residual starts the tail of the set.
        if let Some((_, child)) = stop
            .children
            .iter()
            .find(|&(label, _)| label.as_slice() > rest)
        {
            return if child.is_end {
                Some(child.as_ref())
            } else {
                child.first_key()
            };
        }
        stop.next_node()
    }

    /// Iterate over all keys in lexicographic order.
    pub fn iter(&self) -> Iter<'_> {
        let first = if self.root.is_end {
            Some(self.root.as_ref())
        } else {
            self.root.first_key()
        };
        Iter::new(
            Cursor::new(&self.root, first),
            Cursor::new(&self.root, None),
        )
    }

    /// Iterate over the keys starting with `prefix`, in lexicographic
    /// order. The empty prefix iterates the whole set.
    pub fn prefix_iter(&self, prefix: impl AsRef<[u8]>) -> Iter<'_> {
        let prefix = prefix.as_ref();
        Iter::new(self.find_prefix(prefix), self.prefix_end(prefix))
    }

    /// The smallest key, or `None` on an empty set.
    pub fn first(&self) -> Option<Vec<u8>> {
        if self.root.is_end {
            return Some(Vec::new());
        }
        self.root.first_key().map(Node::key)
    }

    /// The largest key, or `None` on an empty set.
    pub fn last(&self) -> Option<Vec<u8>> {
        self.root
            .last_key()
            .map(Node::key)
            .or_else(|| self.root.is_end.then(Vec::new))
    }

    /// Insert `key`, returning whether it was newly added. Inserting a
    /// present key is a no-op.
    pub fn insert(&mut self, key: impl AsRef<[u8]>) -> bool {
        let mut rest = key.as_ref();
        let loc = descend_mut(&mut self.root, &mut rest);
        let inserted = if rest.is_empty() {
            // The key is already representable at an existing vertex.
            !mem::replace(&mut loc.is_end, true)
        } else {
            let loc_ptr = NonNull::from(&mut *loc);
            let shared = loc
                .children
                .keys()
                .find(|label| label[0] == rest[0])
                .cloned();
            match shared {
                None => {
                    // No sibling competes for the first byte: hang a leaf.
                    let leaf = Box::new(Node::new(true, Some(loc_ptr)));
                    loc.children.insert(rest.to_vec(), leaf);
                }
                Some(child_label) => {
                    let common_len = rest
                        .iter()
                        .zip(&child_label)
                        .take_while(|(a, b)| a == b)
                        .count();
                    let (common, post_key) = rest.split_at(common_len);
                    let post_child = &child_label[common_len..];
                    // The descent stopped above this child, so the child
                    // label cannot be a prefix of the remaining key.
                    debug_assert!(!post_child.is_empty());

                    // Split the edge: a junction takes the common part, the
                    // existing child moves beneath it under its own tail.
                    let mut junction = Box::new(Node::new(post_key.is_empty(), Some(loc_ptr)));
                    let mut moved = loc
                        .children
                        .remove(&child_label)
                        .expect("shared-prefix child was just found");
                    moved.parent = Some(NonNull::from(&mut *junction));
                    junction.children.insert(post_child.to_vec(), moved);
                    if !post_key.is_empty() {
                        let leaf =
                            Box::new(Node::new(true, Some(NonNull::from(&mut *junction))));
                        junction.children.insert(post_key.to_vec(), leaf);
                    }
                    loc.children.insert(common.to_vec(), junction);
                }
            }
            true
        };
        if inserted {
            self.len += 1;
        }
        debug_assert!(self.root.check_invariants(true));
        inserted
    }

    /// Remove `key`, returning whether it was present. Removing an absent
    /// key is a no-op.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> bool {
        let removed = remove_at(&mut self.root, key.as_ref());
        if removed {
            self.len -= 1;
        }
        debug_assert!(self.root.check_invariants(true));
        removed
    }

    /// Remove every key starting with `prefix`, returning how many were
    /// removed. The empty prefix clears the set.
    pub fn remove_prefix(&mut self, prefix: impl AsRef<[u8]>) -> usize {
        let prefix = prefix.as_ref();
        let removed = if prefix.is_empty() {
            let all = self.len;
            self.root.children.clear();
            self.root.is_end = false;
            all
        } else {
            remove_prefix_at(&mut self.root, prefix)
        };
        self.len -= removed;
        debug_assert!(self.root.check_invariants(true));
        removed
    }

    /// Remove all keys.
    pub fn clear(&mut self) {
        self.root.children.clear();
        self.root.is_end = false;
        self.len = 0;
        debug_assert!(self.root.check_invariants(true));
    }

    /// Whether every key of `self` is also in `other`.
    pub fn is_subset(&self, other: &RadixSet) -> bool {
        if self.len > other.len {
            return false;
        }
        // Both key streams are sorted, so a single merge pass decides
        // inclusion.
        let mut candidates = other.iter();
        'keys: for key in self.iter() {
            for candidate in candidates.by_ref() {
                match candidate.cmp(&key) {
                    Ordering::Less => continue,
                    Ordering::Equal => continue 'keys,
                    Ordering::Greater => return false,
                }
            }
            return false;
        }
        true
    }

    /// Whether every key of `other` is also in `self`.
    pub fn is_superset(&self, other: &RadixSet) -> bool {
        other.is_subset(self)
    }

    /// Serialize the tree structure as a compact JSON string.
    ///
    /// Without end markers, each vertex is an object mapping edge labels to
    /// child objects, and a childless vertex is `{}`. With end markers,
    /// each vertex becomes `{"end":<bool>,"children":{...}}`. Labels are
    /// rendered as UTF-8, lossily where they are not valid UTF-8.
    pub fn to_json(&self, include_ends: bool) -> String {
        json::subtree_to_json(&self.root, include_ends)
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> bool {
        self.root.check_invariants(true)
    }
}

/// Mutable twin of `Node::approximate_match`, used by insertion.
fn descend_mut<'n>(node: &'n mut Node, key: &mut &[u8]) -> &'n mut Node {
    if key.is_empty() {
        return node;
    }
    let matched = node
        .children
        .keys()
        .find(|label| key.starts_with(label.as_slice()))
        .cloned();
    match matched {
        Some(label) => {
            *key = &key[label.len()..];
            let child = node
                .children
                .get_mut(&label)
                .expect("matched child was just found");
            descend_mut(child, key)
        }
        None => node,
    }
}

/// Remove `key` below `node`, where `node`'s own representation has already
/// been consumed. Returns whether a key was removed; on the way back up,
/// each frame re-establishes the structural invariants for the child it
/// descended into.
fn remove_at(node: &mut Node, key: &[u8]) -> bool {
    if key.is_empty() {
        if !node.is_end {
            return false;
        }
        node.is_end = false;
        return true;
    }
    let matched = node
        .children
        .keys()
        .find(|label| key.starts_with(label.as_slice()))
        .cloned();
    let Some(label) = matched else {
        return false;
    };
    let rest = &key[label.len()..];
    let child = node
        .children
        .get_mut(&label)
        .expect("matched child was just found");
    if !remove_at(child, rest) {
        return false;
    }
    coalesce(node, &label);
    true
}

/// Remove the subtree rooted at the vertex matching `prefix` below `node`.
/// Returns the number of keys dropped.
fn remove_prefix_at(node: &mut Node, prefix: &[u8]) -> usize {
    debug_assert!(!prefix.is_empty());
    enum Step {
        Descend(Vec<u8>),
        Detach(Vec<u8>),
    }
    let mut step = None;
    for label in node.children.keys() {
        if prefix.len() > label.len() && prefix.starts_with(label.as_slice()) {
            step = Some(Step::Descend(label.clone()));
            break;
        }
        if label.starts_with(prefix) {
            step = Some(Step::Detach(label.clone()));
            break;
        }
    }
    match step {
        None => 0,
        Some(Step::Descend(label)) => {
            let rest = &prefix[label.len()..];
            let child = node
                .children
                .get_mut(&label)
                .expect("matched child was just found");
            let removed = remove_prefix_at(child, rest);
            if removed > 0 {
                coalesce(node, &label);
            }
            removed
        }
        Some(Step::Detach(label)) => {
            let child = node
                .children
                .remove(&label)
                .expect("matched child was just found");
            child.key_count()
        }
    }
}

/// Re-establish the invariants for `node`'s child under `label` after a
/// removal in that child's subtree: drop it when it became an unmarked
/// leaf, or splice it out when it became an unmarked single-child vertex by
/// joining the two edge labels.
fn coalesce(node: &mut Node, label: &[u8]) {
    let child = node
        .children
        .get(label)
        .expect("coalesce target exists");
    if child.is_end {
        return;
    }
    match child.children.len() {
        0 => {
            node.children.remove(label);
        }
        1 => {
            let mut removed = node
                .children
                .remove(label)
                .expect("coalesce target exists");
            let (tail, mut grandchild) = removed
                .children
                .pop_first()
                .expect("length was checked above");
            grandchild.parent = Some(NonNull::from(&mut *node));
            let mut joined = label.to_vec();
            joined.extend_from_slice(&tail);
            node.children.insert(joined, grandchild);
        }
        _ => {}
    }
}

impl Default for RadixSet {
    fn default() -> RadixSet {
        RadixSet::new()
    }
}

impl Clone for RadixSet {
    fn clone(&self) -> RadixSet {
        RadixSet {
            root: self.root.clone_subtree(),
            len: self.len,
        }
    }
}

/// Equality of stored key sets, decided structurally: two tries holding the
/// same keys have identical shape.
impl PartialEq for RadixSet {
    fn eq(&self, other: &RadixSet) -> bool {
        self.len == other.len && self.root.equals(&other.root)
    }
}

impl Eq for RadixSet {}

/// The proper-subset partial order, not a lexicographic comparison:
/// `a < b` holds exactly when `a` is a proper subset of `b`, and sets
/// that are neither subset nor superset of one another are incomparable.
impl PartialOrd for RadixSet {
    fn partial_cmp(&self, other: &RadixSet) -> Option<Ordering> {
        match self.len.cmp(&other.len) {
            Ordering::Equal => (self == other).then_some(Ordering::Equal),
            Ordering::Less => self.is_subset(other).then_some(Ordering::Less),
            Ordering::Greater => other.is_subset(self).then_some(Ordering::Greater),
        }
    }
}

impl fmt::Debug for RadixSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|key| String::from_utf8_lossy(&key).into_owned()))
            .finish()
    }
}

impl<K: AsRef<[u8]>> Extend<K> for RadixSet {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: AsRef<[u8]>> FromIterator<K> for RadixSet {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> RadixSet {
        let mut set = RadixSet::new();
        set.extend(iter);
        set
    }
}

impl<K: AsRef<[u8]>, const N: usize> From<[K; N]> for RadixSet {
    fn from(keys: [K; N]) -> RadixSet {
        keys.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a RadixSet {
    type Item = Vec<u8>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// `a += &b` inserts every key of `b`. Aliasing `a` and `b` is ruled out by
/// the borrow checker.
impl AddAssign<&RadixSet> for RadixSet {
    fn add_assign(&mut self, rhs: &RadixSet) {
        for key in rhs {
            self.insert(key);
        }
    }
}

/// `a -= &b` removes every key of `b`.
impl SubAssign<&RadixSet> for RadixSet {
    fn sub_assign(&mut self, rhs: &RadixSet) {
        for key in rhs {
            self.remove(key);
        }
    }
}

impl Add<&RadixSet> for RadixSet {
    type Output = RadixSet;

    fn add(mut self, rhs: &RadixSet) -> RadixSet {
        self += rhs;
        self
    }
}

impl Add<&RadixSet> for &RadixSet {
    type Output = RadixSet;

    fn add(self, rhs: &RadixSet) -> RadixSet {
        self.clone() + rhs
    }
}

impl Sub<&RadixSet> for RadixSet {
    type Output = RadixSet;

    fn sub(mut self, rhs: &RadixSet) -> RadixSet {
        self -= rhs;
        self
    }
}

impl Sub<&RadixSet> for &RadixSet {
    type Output = RadixSet;

    fn sub(self, rhs: &RadixSet) -> RadixSet {
        self.clone() - rhs
    }
}
