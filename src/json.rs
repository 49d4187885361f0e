//! Stable JSON rendering of (sub)trees.
//!
//! Two shapes are produced, both with compact separators and map entries in
//! label order. Without end markers a vertex is just the map from its edge
//! labels to child objects; with end markers every vertex becomes
//! `{"end":<bool>,"children":{...}}`. Serialization goes through manual
//! [`serde::Serialize`] impls so the field order is fixed by construction.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::node::Node;

/// Label map only; a childless vertex renders as `{}`.
struct Subtree<'a>(&'a Node);

impl Serialize for Subtree<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.children.len()))?;
        for (label, child) in &self.0.children {
            map.serialize_entry(&String::from_utf8_lossy(label), &Subtree(child))?;
        }
        map.end()
    }
}

/// Vertex with an explicit end flag and a wrapped children map.
struct Annotated<'a>(&'a Node);

impl Serialize for Annotated<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("end", &self.0.is_end)?;
        map.serialize_entry("children", &AnnotatedChildren(self.0))?;
        map.end()
    }
}

struct AnnotatedChildren<'a>(&'a Node);

impl Serialize for AnnotatedChildren<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.children.len()))?;
        for (label, child) in &self.0.children {
            map.serialize_entry(&String::from_utf8_lossy(label), &Annotated(child))?;
        }
        map.end()
    }
}

pub(crate) fn subtree_to_json(node: &Node, include_ends: bool) -> String {
    let rendered = if include_ends {
        serde_json::to_string(&Annotated(node))
    } else {
        serde_json::to_string(&Subtree(node))
    };
    rendered.expect("string-keyed maps always serialize")
}
