//! Error types for the workflow graph core

use thiserror::Error;

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while mutating or restructuring a graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// A referenced node does not exist
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// An added node's ID collides with an existing node
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),

    /// A node was dropped onto itself
    #[error("Cannot move node '{0}' relative to itself")]
    MoveOntoSelf(String),

    /// A node was dropped into its own subtree
    #[error("Cannot move '{dragged}' under '{target}': it is inside the moved subtree")]
    MoveIntoOwnSubtree { dragged: String, target: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
