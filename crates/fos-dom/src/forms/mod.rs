//! Form Elements Module
//!
//! Form-associable elements: form, fieldset, input, select, textarea.

mod input;
mod textarea;
mod select;
mod form;
mod fieldset;
mod file;

pub use input::{InputElement, InputType};
pub use textarea::TextareaElement;
pub use select::{OptionElement, SelectElement};
pub use form::{FormData, FormDataValue, FormElement};
pub use fieldset::FieldsetElement;
pub use file::FileEntry;

/// Trait for form control elements
pub trait FormControl {
    /// Get the element's name
    fn name(&self) -> Option<&str>;

    /// Get the element's value as the DOM reports it
    fn value(&self) -> String;

    /// Set the element's value
    fn set_value(&mut self, value: &str);

    /// Check if the element is disabled
    fn is_disabled(&self) -> bool;
}
