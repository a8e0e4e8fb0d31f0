//! Fieldset Element
//!
//! Groups related form controls. A named fieldset namespaces the
//! values of the controls inside it.

/// Fieldset element
#[derive(Debug, Clone, Default)]
pub struct FieldsetElement {
    /// Fieldset name
    pub name: Option<String>,
    /// Disabled state (disables all descendants)
    pub disabled: bool,
    /// Legend text
    pub legend: Option<String>,
}

impl FieldsetElement {
    /// Create a new fieldset
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a named fieldset
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the legend
    pub fn with_legend(mut self, text: impl Into<String>) -> Self {
        self.legend = Some(text.into());
        self
    }

    /// Mark disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}
