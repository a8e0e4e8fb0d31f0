//! Multipart uploads
//!
//! Files cannot travel inside a JSON message, so operations carrying files
//! are sent as `multipart/form-data` following the GraphQL multipart
//! request convention: an `operations` field with every file replaced by
//! `null`, a `map` field saying where each file belongs, and one field per
//! file named `0`, `1`, ...

use fos_dom::{FileEntry, FormData};
use fos_forms::{flatten_hash, strip_array_marker, HashValue};
use serde_json::{Map, Value};

use crate::error::UploadError;
use crate::payload::{GraphqlSubscriptionPayload, SubscriptionPayload};

/// Files found in a hash with their dotted location (`avatar`,
/// `attachments.1`), depth first
pub fn collect_files(hash: &HashValue) -> Vec<(String, FileEntry)> {
    let mut files = Vec::new();
    walk_files(String::new(), hash, &mut files);
    files
}

fn walk_files(path: String, value: &HashValue, out: &mut Vec<(String, FileEntry)>) {
    let child = |key: &dyn std::fmt::Display| {
        if path.is_empty() {
            key.to_string()
        } else {
            format!("{path}.{key}")
        }
    };
    match value {
        HashValue::File(file) => out.push((path.clone(), file.clone())),
        HashValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk_files(child(&index), item, out);
            }
        }
        HashValue::Object(map) => {
            for (key, item) in map {
                walk_files(child(key), item, out);
            }
        }
        _ => {}
    }
}

/// Render a GraphQL operation as a multipart body
pub fn multipart_form_data(payload: &GraphqlSubscriptionPayload) -> Result<FormData, UploadError> {
    if !matches!(payload.variables, HashValue::Object(_) | HashValue::Null) {
        return Err(UploadError::VariablesNotObject);
    }

    let files = collect_files(&payload.variables);
    let mut map = Map::new();
    for (index, (path, _)) in files.iter().enumerate() {
        map.insert(
            index.to_string(),
            Value::Array(vec![Value::String(format!("variables.{path}"))]),
        );
    }

    let mut form = FormData::new();
    form.append("operations", serde_json::to_string(&payload.to_message())?);
    form.append("map", serde_json::to_string(&Value::Object(map))?);
    for (index, (_, file)) in files.into_iter().enumerate() {
        form.append_file(index.to_string(), file);
    }
    tracing::debug!(files = form.len() - 2, "built multipart operation");
    Ok(form)
}

/// Flatten a hash into form fields named by dotted path without array
/// markers (`phones.0.number`). Nulls and empty containers are skipped.
pub fn to_form_data(hash: &HashValue) -> FormData {
    let mut form = FormData::new();
    for (path, value) in flatten_hash(hash) {
        let name = path
            .split('.')
            .map(strip_array_marker)
            .collect::<Vec<_>>()
            .join(".");
        match value {
            HashValue::String(s) => form.append(name, s),
            HashValue::Number(_) | HashValue::Bool(_) => form.append(name, value.to_json().to_string()),
            HashValue::File(file) => form.append_file(name, file),
            HashValue::Null | HashValue::Array(_) | HashValue::Object(_) => {}
        }
    }
    form
}
