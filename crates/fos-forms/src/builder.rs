//! Nested hash builder
//!
//! Places values at dotted paths. A segment ending in `[]` makes the
//! container created at that level an array; numeric segments then
//! index into it.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::{is_array_marked, strip_array_marker, HashValue};

/// Incrementally assembles a nested object/array structure from
/// `(path, value)` pairs.
#[derive(Debug, Clone)]
pub struct HashBuilder {
    root: Node,
}

#[derive(Debug, Clone)]
enum Node {
    Object(IndexMap<String, Slot>),
    Array(BTreeMap<usize, Slot>),
}

#[derive(Debug, Clone)]
enum Slot {
    Leaf(HashValue),
    Node(Node),
}

impl HashBuilder {
    pub fn new() -> Self {
        Self {
            root: Node::Object(IndexMap::new()),
        }
    }

    /// Place `value` at `path`. Empty paths are ignored; a later write to
    /// the same path replaces the earlier one.
    pub fn set_value(&mut self, path: &str, value: impl Into<HashValue>) {
        if path.is_empty() {
            return;
        }
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut node = &mut self.root;
        for segment in parents {
            match node.child_node(segment) {
                Some(child) => node = child,
                None => return,
            }
        }
        node.insert(last, Slot::Leaf(value.into()));
    }

    /// Apply `set_value` to every pair, in order
    pub fn set_values<I, P, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (P, V)>,
        P: AsRef<str>,
        V: Into<HashValue>,
    {
        for (path, value) in pairs {
            self.set_value(path.as_ref(), value);
        }
    }

    /// Materialize the plain nested structure
    pub fn build(&self) -> HashValue {
        self.root.build()
    }
}

impl Default for HashBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    fn for_segment(segment: &str) -> Self {
        if is_array_marked(segment) {
            Node::Array(BTreeMap::new())
        } else {
            Node::Object(IndexMap::new())
        }
    }

    /// Child node under `segment`, created on first use. The container
    /// type is fixed by whichever segment created it.
    fn child_node(&mut self, segment: &str) -> Option<&mut Node> {
        let key = strip_array_marker(segment);
        let slot = match self {
            Node::Object(map) => map
                .entry(key.to_string())
                .or_insert_with(|| Slot::Node(Node::for_segment(segment))),
            Node::Array(items) => items
                .entry(array_index(key)?)
                .or_insert_with(|| Slot::Node(Node::for_segment(segment))),
        };
        if let Slot::Leaf(_) = slot {
            *slot = Slot::Node(Node::for_segment(segment));
        }
        match slot {
            Slot::Node(node) => Some(node),
            Slot::Leaf(_) => None,
        }
    }

    fn insert(&mut self, segment: &str, slot: Slot) {
        let key = strip_array_marker(segment);
        match self {
            Node::Object(map) => {
                map.insert(key.to_string(), slot);
            }
            Node::Array(items) => {
                if let Some(index) = array_index(key) {
                    items.insert(index, slot);
                }
            }
        }
    }

    fn build(&self) -> HashValue {
        match self {
            Node::Object(map) => HashValue::Object(
                map.iter().map(|(k, slot)| (k.clone(), slot.build())).collect(),
            ),
            // Dense: holes left by missing indices are closed up
            Node::Array(items) => HashValue::Array(items.values().map(Slot::build).collect()),
        }
    }
}

impl Slot {
    fn build(&self) -> HashValue {
        match self {
            Slot::Leaf(value) => value.clone(),
            Slot::Node(node) => node.build(),
        }
    }
}

/// Canonical array index (`"0"`, `"12"`, but not `"01"` or `"x"`)
fn array_index(key: &str) -> Option<usize> {
    let index = key.parse::<usize>().ok().filter(|i| i.to_string() == key);
    if index.is_none() {
        tracing::debug!(key, "dropping non-index key written into an array");
    }
    index
}
