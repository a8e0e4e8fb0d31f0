//! Select and Option Element Implementation
//!
//! Dropdown and list selection.

use super::FormControl;

/// Select element
#[derive(Debug, Clone, Default)]
pub struct SelectElement {
    pub name: Option<String>,
    pub disabled: bool,
    pub required: bool,
    pub multiple: bool,
    pub options: Vec<OptionElement>,
}

/// Option element
#[derive(Debug, Clone, Default)]
pub struct OptionElement {
    pub value: String,
    pub text: String,
    pub selected: bool,
    pub disabled: bool,
}

impl OptionElement {
    /// Create a new option
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Mark as selected
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Mark as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl SelectElement {
    /// Create a new select element
    pub fn new() -> Self {
        Self::default()
    }

    /// Set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Allow several selected options
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Mark disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Add an option. A single-select keeps only the latest selected option.
    pub fn add_option(&mut self, option: OptionElement) {
        if option.selected && !self.multiple {
            for opt in &mut self.options {
                opt.selected = false;
            }
        }
        self.options.push(option);
    }

    /// Add multiple options
    pub fn with_options(mut self, options: Vec<OptionElement>) -> Self {
        for opt in options {
            self.add_option(opt);
        }
        self
    }

    /// Get selected option(s), skipping disabled ones
    pub fn selected_options(&self) -> Vec<&OptionElement> {
        self.options
            .iter()
            .filter(|o| o.selected && !o.disabled)
            .collect()
    }

    /// Get selected value
    pub fn selected_value(&self) -> Option<&str> {
        self.selected_options().first().map(|o| o.value.as_str())
    }

    /// Values of every selected option
    pub fn selected_values(&self) -> Vec<&str> {
        self.selected_options()
            .into_iter()
            .map(|o| o.value.as_str())
            .collect()
    }

    /// Select the option at `index`
    pub fn set_selected_index(&mut self, index: usize) {
        if !self.multiple {
            for opt in &mut self.options {
                opt.selected = false;
            }
        }
        if let Some(opt) = self.options.get_mut(index) {
            opt.selected = true;
        }
    }
}

impl FormControl for SelectElement {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn value(&self) -> String {
        self.selected_value().unwrap_or_default().to_string()
    }

    fn set_value(&mut self, value: &str) {
        if let Some(index) = self.options.iter().position(|o| o.value == value) {
            self.set_selected_index(index);
        }
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}
