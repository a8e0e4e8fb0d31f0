//! DOM Node Operations
//!
//! Errors raised by tree mutation (appendChild and friends).

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0:?} not found")]
    NotFound(NodeId),

    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("cannot insert {child:?} under {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Parent cannot hold children (text nodes)
    #[error("node {0:?} cannot have children")]
    InvalidNodeType(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomError::HierarchyRequest { parent: NodeId(3), child: NodeId(1) };
        assert_eq!(err.to_string(), "cannot insert NodeId(1) under NodeId(3)");
        assert_eq!(DomError::NotFound(NodeId(9)).to_string(), "node NodeId(9) not found");
    }
}
