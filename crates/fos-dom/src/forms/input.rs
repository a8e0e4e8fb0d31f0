//! Input Element Implementation
//!
//! Supports the HTML5 input types a form can submit.

use super::{FileEntry, FormControl};

/// HTML input types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    #[default]
    Text,
    Password,
    Email,
    Number,
    Tel,
    Url,
    Search,
    Date,
    Time,
    DatetimeLocal,
    Month,
    Week,
    Color,
    Range,
    File,
    Hidden,
    Checkbox,
    Radio,
    Submit,
    Reset,
    Button,
    Image,
}

impl InputType {
    /// Parse from string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "text" => Self::Text,
            "password" => Self::Password,
            "email" => Self::Email,
            "number" => Self::Number,
            "tel" => Self::Tel,
            "url" => Self::Url,
            "search" => Self::Search,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime-local" => Self::DatetimeLocal,
            "month" => Self::Month,
            "week" => Self::Week,
            "color" => Self::Color,
            "range" => Self::Range,
            "file" => Self::File,
            "hidden" => Self::Hidden,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "submit" => Self::Submit,
            "reset" => Self::Reset,
            "button" => Self::Button,
            "image" => Self::Image,
            _ => Self::Text,
        }
    }

    /// Check if this is a button type
    pub fn is_button(&self) -> bool {
        matches!(self, Self::Submit | Self::Reset | Self::Button | Self::Image)
    }

    /// Checkbox or radio
    pub fn is_checkable(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }

    /// Number or range
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Range)
    }
}

/// Input element
#[derive(Debug, Clone, Default)]
pub struct InputElement {
    pub input_type: InputType,
    pub name: Option<String>,
    /// Current value as a string, like `HTMLInputElement.value`
    pub value: String,
    pub disabled: bool,
    pub required: bool,
    /// Checkbox/radio state
    pub checked: bool,
    /// File inputs accepting several files
    pub multiple: bool,
    /// Selected files for `type="file"`
    pub files: Vec<FileEntry>,
}

impl InputElement {
    /// Create a new input element
    pub fn new(input_type: InputType) -> Self {
        let value = match input_type {
            // Checkables submit "on" unless a value attribute says otherwise
            InputType::Checkbox | InputType::Radio => "on".to_string(),
            _ => String::new(),
        };
        Self {
            input_type,
            value,
            ..Default::default()
        }
    }

    /// Create a text input
    pub fn text() -> Self {
        Self::new(InputType::Text)
    }

    /// Create a checkbox
    pub fn checkbox() -> Self {
        Self::new(InputType::Checkbox)
    }

    /// Create a radio button
    pub fn radio() -> Self {
        Self::new(InputType::Radio)
    }

    /// Create a file input
    pub fn file() -> Self {
        Self::new(InputType::File)
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Mark checked
    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Mark disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Set required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow multiple files
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Add a selected file
    pub fn with_file(mut self, file: FileEntry) -> Self {
        self.files.push(file);
        self
    }
}

impl FormControl for InputElement {
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
