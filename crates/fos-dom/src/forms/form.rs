//! Form Element Implementation
//!
//! Form container and the multipart entry list used for submission.

use super::FileEntry;

/// Form element
#[derive(Debug, Clone, Default)]
pub struct FormElement {
    pub name: Option<String>,
    pub action: String,
    pub novalidate: bool,
}

impl FormElement {
    /// Create a new form
    pub fn new() -> Self {
        Self::default()
    }

    /// Set action URL
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }
}

/// Form data for submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<(String, FormDataValue)>,
}

/// Form data value
#[derive(Debug, Clone, PartialEq)]
pub enum FormDataValue {
    Text(String),
    File(FileEntry),
}

impl FormData {
    /// Create empty form data
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text value
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), FormDataValue::Text(value.into())));
    }

    /// Append a file
    pub fn append_file(&mut self, name: impl Into<String>, file: FileEntry) {
        self.entries.push((name.into(), FormDataValue::File(file)));
    }

    /// Get the first text value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find_map(|(n, v)| match v {
            FormDataValue::Text(s) if n == name => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get the first file by name
    pub fn get_file(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find_map(|(n, v)| match v {
            FormDataValue::File(f) if n == name => Some(f),
            _ => None,
        })
    }

    /// Get all text values by name
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .filter_map(|(_, v)| match v {
                FormDataValue::Text(s) => Some(s.as_str()),
                FormDataValue::File(_) => None,
            })
            .collect()
    }

    /// Check if key exists
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Delete all entries with name
    pub fn delete(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    /// Iterate over entries
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FormDataValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
