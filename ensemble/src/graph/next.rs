//! Routing decision returned by every node step.

/// What the graph should do after a node returns.
///
/// `Node(id)` is how the supervisor routes to a worker and how a worker hands
/// control back; `Continue` follows the linear edge order; `End` stops the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Run the next node in edge order, or end if this was the last.
    Continue,
    /// Jump to the node with this id (supervisor → worker routing).
    Node(String),
    /// Stop and return the current state.
    End,
}
