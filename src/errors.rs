//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! Recoverable per-frame conditions (a missing attribute, a disposed
//! resource handle) are logged and skipped inside the render pipeline;
//! the variants here cover API-level failures that callers can act on.

use thiserror::Error;

use crate::scene::NodeKey;

/// The main error type for the Aether engine.
#[derive(Error, Debug)]
pub enum AetherError {
    /// Attaching a node would create a cycle in the scene graph.
    #[error("Attaching {child:?} to {parent:?} would create a cycle")]
    CyclicGraph {
        /// The node being attached
        child: NodeKey,
        /// The requested parent
        parent: NodeKey,
    },

    /// A node handle did not resolve to a live node.
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// The node passed as a camera carries no camera component.
    #[error("Node {0:?} has no camera component")]
    CameraNotFound(NodeKey),

    /// No compiled program was registered for a material variant.
    #[error("No program registered for shader '{0}'")]
    ProgramNotFound(String),
}

/// Convenience alias used by the public API.
pub type Result<T> = std::result::Result<T, AetherError>;
