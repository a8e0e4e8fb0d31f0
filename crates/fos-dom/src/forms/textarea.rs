//! Textarea Element Implementation
//!
//! Multi-line text input.

use super::FormControl;

/// Textarea element
#[derive(Debug, Clone, Default)]
pub struct TextareaElement {
    pub name: Option<String>,
    pub value: String,
    pub disabled: bool,
    pub required: bool,
    pub rows: u32,
    pub cols: u32,
}

impl TextareaElement {
    /// Create a new textarea
    pub fn new() -> Self {
        Self {
            rows: 2,
            cols: 20,
            ..Default::default()
        }
    }

    /// Set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Mark disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl FormControl for TextareaElement {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}
