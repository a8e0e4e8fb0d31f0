//! fOS Forms
//!
//! Turns the controls of a form into a nested value hash.
//!
//! - [`FormInspector`] walks a form's controls and fieldsets and resolves
//!   each control to a dotted path (`addresses[].0.city`).
//! - [`HashBuilder`] assembles `(path, value)` pairs into nested
//!   objects and arrays.
//! - [`flatten_hash`] goes the other way.
//! - [`validators`] checks values in a hash against simple constraints.

mod value;
mod builder;
mod flatten;
mod inspector;
pub mod validators;

pub use value::HashValue;
pub use builder::HashBuilder;
pub use flatten::flatten_hash;
pub use inspector::{FormInspector, extract_value_hash};
pub use validators::{ValidationError, ValidationErrors, ValidityState, VariableRule};

pub use fos_dom::FileEntry;

/// Suffix marking a path segment whose container is an array
pub const ARRAY_MARKER: &str = "[]";

/// Whether a name or path segment carries the array marker
#[inline]
pub fn is_array_marked(segment: &str) -> bool {
    segment.ends_with(ARRAY_MARKER)
}

/// Strip one trailing array marker
#[inline]
pub fn strip_array_marker(segment: &str) -> &str {
    segment.strip_suffix(ARRAY_MARKER).unwrap_or(segment)
}
