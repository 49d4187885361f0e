//! Tree vertices and the recursive matching/navigation primitives.
//!
//! A [`Node`] owns its children through the ordered label map; the parent
//! link is a non-owning raw pointer. The structural invariants (no empty
//! labels, no two sibling labels sharing a first byte, every leaf
//! end-marked, every non-root interior vertex either end-marked or holding
//! at least two children) guarantee a parent outlives all of its
//! descendants, which is what makes the parent pointer sound to follow.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::ptr;
use std::ptr::NonNull;

/// A single vertex of the radix tree.
///
/// The concatenation of edge labels from the root down to a vertex is that
/// vertex's key; `is_end` marks the vertices whose key is stored in the set.
pub(crate) struct Node {
    pub(crate) is_end: bool,
    pub(crate) parent: Option<NonNull<Node>>,
    pub(crate) children: BTreeMap<Vec<u8>, Box<Node>>,
}

// SAFETY: A `Node` and its subtree form a single-owner structure; the raw
// parent pointer is only dereferenced while the owning tree is alive and is
// never used to mutate through a shared reference. Moving the structure to
// another thread moves the whole tree, and shared access is read-only.
unsafe impl Send for Node {}
// SAFETY: All mutation goes through `&mut` paths owned by the container;
// `&Node` only permits reads, including reads through the parent pointer.
unsafe impl Sync for Node {}

impl Node {
    pub(crate) fn new(is_end: bool, parent: Option<NonNull<Node>>) -> Node {
        Node {
            is_end,
            parent,
            children: BTreeMap::new(),
        }
    }

    pub(crate) fn parent(&self) -> Option<&Node> {
        // SAFETY: Parents own their children, so the parent of a live node
        // is itself live; the returned borrow is tied to `self`.
        self.parent.map(|parent| unsafe { parent.as_ref() })
    }

    /// Deep copy of the subtree rooted here. Parent links are wired within
    /// the copy; the copy's own parent is left unset.
    pub(crate) fn clone_subtree(&self) -> Box<Node> {
        let mut copy = Box::new(Node::new(self.is_end, None));
        for (label, child) in &self.children {
            let mut child_copy = child.clone_subtree();
            child_copy.parent = Some(NonNull::from(&mut *copy));
            copy.children.insert(label.clone(), child_copy);
        }
        copy
    }

    /// Structural equality: same end marker, same labels, children pairwise
    /// equal. Both label maps are ordered, so one parallel scan suffices.
    pub(crate) fn equals(&self, other: &Node) -> bool {
        if self.is_end != other.is_end || self.children.len() != other.children.len() {
            return false;
        }
        self.children
            .iter()
            .zip(&other.children)
            .all(|((label_a, a), (label_b, b))| label_a == label_b && a.equals(b))
    }

    /// Number of keys stored at or below this vertex.
    pub(crate) fn key_count(&self) -> usize {
        let mut count = usize::from(self.is_end);
        for child in self.children.values() {
            count += child.key_count();
        }
        count
    }

    /// Descend while some child label is a prefix of the remaining key.
    /// The consumed portion is stripped off `key`, so on return `key` holds
    /// exactly the suffix that could not be matched. Always lands on a valid
    /// vertex: the start trivially matches the empty prefix.
    pub(crate) fn approximate_match<'n>(&'n self, key: &mut &[u8]) -> &'n Node {
        if key.is_empty() {
            return self;
        }
        for (label, child) in &self.children {
            if key.starts_with(label) {
                *key = &key[label.len()..];
                return child.approximate_match(key);
            }
        }
        self
    }

    /// Find the vertex whose subtree holds exactly the keys with prefix
    /// `prf`. After the approximate descent, a leftover residual can only be
    /// matched by a child whose label extends it; anything else means no key
    /// carries the prefix.
    pub(crate) fn prefix_match<'n>(&'n self, prf: &mut &[u8]) -> Option<&'n Node> {
        let stop = self.approximate_match(prf);
        if prf.is_empty() {
            return Some(stop);
        }
        for (label, child) in &stop.children {
            if label.starts_with(*prf) {
                *prf = &[];
                return Some(child.as_ref());
            }
        }
        None
    }

    /// Find the vertex storing exactly `key`, or `None`. A vertex only
    /// counts as a match when it is end-marked; interior junctions whose key
    /// happens to equal the query do not report presence.
    pub(crate) fn exact_match(&self, key: &[u8]) -> Option<&Node> {
        let mut rest = key;
        let stop = self.approximate_match(&mut rest);
        (rest.is_empty() && stop.is_end).then_some(stop)
    }

    /// The smallest key strictly below this vertex, reached by walking
    /// leftmost children until an end marker. `None` iff there are no
    /// children (the vertex's own end marker is the caller's business).
    pub(crate) fn first_key(&self) -> Option<&Node> {
        let (_, first) = self.children.first_key_value()?;
        let mut node: &Node = first;
        while !node.is_end {
            let (_, next) = node
                .children
                .first_key_value()
                .expect("a non-end vertex always has children");
            node = next;
        }
        Some(node)
    }

    /// The largest key at or below this vertex's children: the rightmost
    /// descent always ends on a leaf, and leaves are end-marked.
    pub(crate) fn last_key(&self) -> Option<&Node> {
        let (_, last) = self.children.last_key_value()?;
        let mut node: &Node = last;
        while let Some((_, next)) = node.children.last_key_value() {
            node = next;
        }
        Some(node)
    }

    /// In-order successor outside this vertex's subtree: climb while this is
    /// the rightmost child, then descend to the first key of the next
    /// sibling over. `None` once the climb reaches the root.
    pub(crate) fn next_node(&self) -> Option<&Node> {
        let mut node = self;
        let mut par = node.parent()?;
        loop {
            let (_, last) = par
                .children
                .last_key_value()
                .expect("a parent always has children");
            if !ptr::eq::<Node>(last.as_ref(), node) {
                break;
            }
            node = par;
            par = node.parent()?;
        }
        let label = par.find_child(node).expect("parent links are consistent");
        let (_, right) = par
            .children
            .range::<[u8], _>((Bound::Excluded(label), Bound::Unbounded))
            .next()
            .expect("a non-rightmost child has a right sibling");
        if right.is_end {
            Some(right.as_ref())
        } else {
            right.first_key()
        }
    }

    /// In-order predecessor. Walking up from a leftmost child lands on the
    /// parent itself when the parent stores a key; otherwise the climb
    /// continues. From a non-leftmost child, the predecessor is the last key
    /// of the left sibling's subtree (or that sibling itself when it is a
    /// leaf).
    pub(crate) fn prev_node(&self) -> Option<&Node> {
        let mut node = self;
        loop {
            let par = node.parent()?;
            let (_, first) = par
                .children
                .first_key_value()
                .expect("a parent always has children");
            if ptr::eq::<Node>(first.as_ref(), node) {
                if par.is_end {
                    return Some(par);
                }
                node = par;
                continue;
            }
            let label = par.find_child(node).expect("parent links are consistent");
            let (_, left) = par
                .children
                .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(label)))
                .next_back()
                .expect("a non-leftmost child has a left sibling");
            return Some(left.last_key().unwrap_or(left.as_ref()));
        }
    }

    /// Reconstruct the key for this vertex by collecting edge labels on the
    /// way up and concatenating them in reverse.
    pub(crate) fn key(&self) -> Vec<u8> {
        let mut labels: Vec<&[u8]> = Vec::new();
        let mut node = self;
        while let Some(par) = node.parent() {
            labels.push(par.find_child(node).expect("parent links are consistent"));
            node = par;
        }
        let mut key = Vec::with_capacity(labels.iter().map(|label| label.len()).sum());
        for label in labels.into_iter().rev() {
            key.extend_from_slice(label);
        }
        key
    }

    /// Locate a child by identity. Fan-out is bounded by the byte alphabet,
    /// so a linear scan is acceptable.
    pub(crate) fn find_child(&self, target: &Node) -> Option<&[u8]> {
        self.children
            .iter()
            .find(|&(_, child)| ptr::eq::<Node>(child.as_ref(), target))
            .map(|(label, _)| label.as_slice())
    }

    /// Verify the structural invariants of the subtree rooted here. Used by
    /// debug assertions and tests only.
    pub(crate) fn check_invariants(&self, is_root: bool) -> bool {
        if is_root && self.parent.is_some() {
            return false;
        }
        // Non-root vertices must either store a key or branch; this covers
        // both the leaf rule and the merged-degenerate rule.
        if !is_root && !self.is_end && self.children.len() < 2 {
            return false;
        }
        let mut prev_first_byte = None;
        for (label, child) in &self.children {
            let Some(&first_byte) = label.first() else {
                return false;
            };
            // Labels are sorted, so shared first bytes would be adjacent.
            if prev_first_byte == Some(first_byte) {
                return false;
            }
            prev_first_byte = Some(first_byte);
            match child.parent {
                Some(parent) if ptr::eq(parent.as_ptr().cast_const(), self) => {}
                _ => return false,
            }
            if !child.check_invariants(false) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::ptr::NonNull;

    use super::Node;

    fn leaf_under(parent: &mut Node, label: &[u8]) -> NonNull<Node> {
        let parent_ptr = NonNull::from(&mut *parent);
        let child = Box::new(Node::new(true, Some(parent_ptr)));
        parent.children.insert(label.to_vec(), child);
        NonNull::from(&mut **parent.children.get_mut(label).unwrap())
    }

    #[test]
    fn key_count_counts_end_markers() {
        let mut root = Box::new(Node::new(false, None));
        assert_eq!(root.key_count(), 0);
        leaf_under(&mut root, b"alpha");
        leaf_under(&mut root, b"beta");
        assert_eq!(root.key_count(), 2);
        root.is_end = true;
        assert_eq!(root.key_count(), 3);
    }

    #[test]
    fn approximate_match_consumes_matched_labels() {
        let mut root = Box::new(Node::new(false, None));
        leaf_under(&mut root, b"car");

        let mut rest: &[u8] = b"carpet";
        let stop = root.approximate_match(&mut rest);
        assert_eq!(rest, b"pet");
        assert!(stop.is_end);

        let mut rest: &[u8] = b"dog";
        let stop = root.approximate_match(&mut rest);
        assert_eq!(rest, b"dog");
        assert!(std::ptr::eq::<Node>(stop, root.as_ref()));
    }

    #[test]
    fn exact_match_requires_end_marker() {
        let mut root = Box::new(Node::new(false, None));
        leaf_under(&mut root, b"car");
        assert!(root.exact_match(b"car").is_some());
        assert!(root.exact_match(b"ca").is_none());
        assert!(root.exact_match(b"carpet").is_none());
        // The root is only a match for the empty key once end-marked.
        assert!(root.exact_match(b"").is_none());
        root.is_end = true;
        assert!(root.exact_match(b"").is_some());
    }

    #[test]
    fn invariants_reject_shared_first_bytes() {
        let mut root = Box::new(Node::new(false, None));
        leaf_under(&mut root, b"car");
        leaf_under(&mut root, b"dog");
        assert!(root.check_invariants(true));
        leaf_under(&mut root, b"cat");
        assert!(!root.check_invariants(true));
    }

    #[test]
    fn invariants_reject_stale_parent_links() {
        let mut root = Box::new(Node::new(false, None));
        leaf_under(&mut root, b"car");
        assert!(root.check_invariants(true));
        root.children.get_mut(b"car".as_slice()).unwrap().parent = None;
        assert!(!root.check_invariants(true));
    }
}
