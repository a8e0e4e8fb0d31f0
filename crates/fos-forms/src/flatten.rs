//! Hash flattening
//!
//! Inverse of [`HashBuilder`](crate::HashBuilder): turns a nested hash back
//! into `(path, value)` pairs. Keys holding arrays are written with the
//! `[]` marker so that rebuilding types them the same way.

use crate::{ARRAY_MARKER, HashValue};

/// Flatten an object hash into dotted-path pairs, depth first, in key order.
///
/// Empty objects and arrays are emitted as leaves. A non-object root has no
/// path of its own and yields nothing.
pub fn flatten_hash(hash: &HashValue) -> Vec<(String, HashValue)> {
    let mut pairs = Vec::new();
    if let HashValue::Object(map) = hash {
        for (key, value) in map {
            walk(key.clone(), value, &mut pairs);
        }
    }
    pairs
}

fn walk(path: String, value: &HashValue, out: &mut Vec<(String, HashValue)>) {
    match value {
        HashValue::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                walk(format!("{path}.{key}"), child, out);
            }
        }
        HashValue::Array(items) if !items.is_empty() => {
            for (index, item) in items.iter().enumerate() {
                walk(format!("{path}{ARRAY_MARKER}.{index}"), item, out);
            }
        }
        leaf => out.push((path, leaf.clone())),
    }
}
