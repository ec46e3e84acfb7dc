//! Error types for scene documents.

use std::path::PathBuf;

use thiserror::Error;

use crate::NodeId;

/// Errors raised while loading, saving or editing a scene document.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Document is not valid JSON for the scene schema.
    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the document failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A node id does not exist in the document.
    #[error("Unknown node #{0}")]
    UnknownNode(NodeId),

    /// No node carries the given name.
    #[error("No node named '{0}'")]
    UnknownName(String),

    /// A node or selection entry points at a missing node.
    #[error("Node #{node} refers to missing node #{target}")]
    DanglingReference {
        /// Node holding the reference (0 for the selection).
        node: NodeId,
        /// Missing target.
        target: NodeId,
    },

    /// A node's parent chain leads back to itself.
    #[error("Node #{0} is its own ancestor")]
    ParentCycle(NodeId),

    /// A node is stored under a key that differs from its id.
    #[error("Node #{id} is stored under key #{key}")]
    IdMismatch {
        /// Map key.
        key: NodeId,
        /// Id recorded in the node.
        id: NodeId,
    },

    /// Curve shapes can only live under transforms.
    #[error("Node #{0} is not a transform")]
    NotATransform(NodeId),

    /// Curve data can only be assigned to curve shapes.
    #[error("Node #{0} is not a nurbsCurve")]
    NotACurve(NodeId),
}

impl SceneError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
