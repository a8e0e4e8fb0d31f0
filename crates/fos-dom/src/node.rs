//! DOM Node
//!
//! Nodes store parent/child links as `NodeId`s into the owning arena.
//! Form-associable elements carry their control state in `ElementKind`.

use crate::forms::{
    FieldsetElement, FormControl, FormElement, InputElement, SelectElement, TextareaElement,
};
use crate::NodeId;

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (None for the document root and detached nodes)
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes not modelled by `kind` (id, class, data-*)
    pub attrs: Vec<Attribute>,
    /// Form-related state
    pub kind: ElementKind,
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// What an element is, as far as forms are concerned
#[derive(Debug, Clone)]
pub enum ElementKind {
    Generic,
    Button,
    Form(FormElement),
    Fieldset(FieldsetElement),
    Input(InputElement),
    Select(SelectElement),
    Textarea(TextareaElement),
}

impl ElementData {
    /// Create an element from its tag name, picking the matching form kind
    pub fn new(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        let kind = match tag.as_str() {
            "form" => ElementKind::Form(FormElement::new()),
            "fieldset" => ElementKind::Fieldset(FieldsetElement::new()),
            "input" => ElementKind::Input(InputElement::text()),
            "select" => ElementKind::Select(SelectElement::new()),
            "textarea" => ElementKind::Textarea(TextareaElement::new()),
            "button" => ElementKind::Button,
            _ => ElementKind::Generic,
        };
        Self {
            tag,
            attrs: Vec::new(),
            kind,
        }
    }

    /// Add an attribute (builder style)
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Get an attribute value.
    ///
    /// `name` and `disabled` are answered from the element's form state.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        match name {
            "name" => self.name(),
            "disabled" => self.is_disabled().then_some(""),
            _ => self
                .attrs
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(name))
                .map(|a| a.value.as_str()),
        }
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        for attr in self.attrs.iter_mut() {
            if attr.name == name {
                attr.value = value;
                return;
            }
        }
        self.attrs.push(Attribute { name, value });
    }

    /// Raw `name` of a form-associable element or fieldset
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Form(f) => f.name.as_deref(),
            ElementKind::Fieldset(f) => f.name.as_deref(),
            ElementKind::Input(i) => i.name(),
            ElementKind::Select(s) => s.name(),
            ElementKind::Textarea(t) => t.name(),
            ElementKind::Generic | ElementKind::Button => None,
        }
    }

    /// The element's own disabled flag (ancestors are not consulted)
    pub fn is_disabled(&self) -> bool {
        match &self.kind {
            ElementKind::Fieldset(f) => f.disabled,
            ElementKind::Input(i) => i.is_disabled(),
            ElementKind::Select(s) => s.is_disabled(),
            ElementKind::Textarea(t) => t.is_disabled(),
            _ => false,
        }
    }

    /// Whether this is an input, select or textarea
    pub fn is_form_control(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Input(_) | ElementKind::Select(_) | ElementKind::Textarea(_)
        )
    }

    /// Whether this is a fieldset
    pub fn is_fieldset(&self) -> bool {
        matches!(self.kind, ElementKind::Fieldset(_))
    }

    /// Whether this is a form
    pub fn is_form(&self) -> bool {
        matches!(self.kind, ElementKind::Form(_))
    }
}

impl From<FormElement> for ElementData {
    fn from(form: FormElement) -> Self {
        Self {
            tag: "form".to_string(),
            attrs: Vec::new(),
            kind: ElementKind::Form(form),
        }
    }
}

impl From<FieldsetElement> for ElementData {
    fn from(fieldset: FieldsetElement) -> Self {
        Self {
            tag: "fieldset".to_string(),
            attrs: Vec::new(),
            kind: ElementKind::Fieldset(fieldset),
        }
    }
}

impl From<InputElement> for ElementData {
    fn from(input: InputElement) -> Self {
        Self {
            tag: "input".to_string(),
            attrs: Vec::new(),
            kind: ElementKind::Input(input),
        }
    }
}

impl From<SelectElement> for ElementData {
    fn from(select: SelectElement) -> Self {
        Self {
            tag: "select".to_string(),
            attrs: Vec::new(),
            kind: ElementKind::Select(select),
        }
    }
}

impl From<TextareaElement> for ElementData {
    fn from(textarea: TextareaElement) -> Self {
        Self {
            tag: "textarea".to_string(),
            attrs: Vec::new(),
            kind: ElementKind::Textarea(textarea),
        }
    }
}
