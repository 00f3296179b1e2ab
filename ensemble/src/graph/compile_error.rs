//! Graph compilation errors.

use thiserror::Error;

/// Returned by `StateGraph::compile` when the graph is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// An edge references a node id that was never added.
    #[error("edge references unknown node: {0}")]
    NodeNotFound(String),
    /// There must be exactly one edge leaving START.
    #[error("graph needs exactly one edge from START")]
    MissingStart,
    /// The chain from START must reach END without revisiting a node.
    #[error("invalid chain: {0}")]
    InvalidChain(String),
}
