//! Agent execution error types.
//!
//! Used by `Node::run` and every agent node in the supervisor graph.

use thiserror::Error;

/// Agent execution error.
///
/// Returned by `Node::run` when a step fails (LLM call failed, tool error,
/// checkpoint load failed). Subsystems with richer failure modes define their
/// own error enums and convert at the node boundary.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, tool error).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format of ExecutionFailed contains "execution failed" and the message.
    #[test]
    fn agent_error_display_execution_failed() {
        let err = AgentError::ExecutionFailed("llm timed out".to_string());
        let s = err.to_string();
        assert!(s.contains("execution failed"), "{}", s);
        assert!(s.contains("llm timed out"), "{}", s);
    }
}
