//! Error types for visad-a3d.

use thiserror::Error;

use crate::scene::NodeId;

/// The main error type for visad-a3d core operations.
#[derive(Error, Debug)]
pub enum VisadError {
    /// A scene node id does not refer to a live node.
    #[error("scene node {0} does not exist")]
    UnknownNode(NodeId),

    /// A node was detached from a parent it is not attached to.
    #[error("node {child} is not a child of node {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Attaching the node would create a cycle in the scene graph.
    #[error("attaching node {child} under node {parent} would create a cycle")]
    SceneCycle { parent: NodeId, child: NodeId },

    /// Two units do not share a base dimension.
    #[error("cannot convert from unit '{from}' to unit '{to}'")]
    IncompatibleUnits { from: String, to: String },

    /// A tuple has no component with the given real type name.
    #[error("tuple has no component named '{0}'")]
    MissingComponent(String),

    /// A tuple component index is out of range.
    #[error("component index {index} out of range for tuple of size {size}")]
    ComponentIndex { index: usize, size: usize },

    /// A data reference has not been given any data yet.
    #[error("data reference '{0}' holds no data")]
    EmptyReference(String),

    /// A display has no live data renderer with the given id.
    #[error("no data renderer with id {0}")]
    UnknownRenderer(usize),

    /// The render engine has shut down and no longer accepts scene tasks.
    #[error("render engine is no longer accepting scene updates")]
    EngineClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for visad-a3d operations.
pub type Result<T> = std::result::Result<T, VisadError>;
