//! fOS DOM - Document Object Model
//!
//! Arena-based element tree holding the form-associable elements
//! (form, fieldset, input, select, textarea) read by the client kit.

mod node;
mod tree;
mod operations;
pub mod forms;

pub use node::{Attribute, ElementData, ElementKind, Node, NodeData};
pub use tree::{Ancestors, Descendants, DomTree};
pub use operations::{DomError, DomResult};
pub use forms::{
    FieldsetElement, FileEntry, FormControl, FormData, FormDataValue, FormElement,
    InputElement, InputType, OptionElement, SelectElement, TextareaElement,
};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
