//! Supervisor graph state: one shared struct flows through every node.
//!
//! State-in, state-out: the supervisor and each worker read from and write to
//! `SupervisorState`. Serde is derived so checkpointers can persist snapshots.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// One tool call requested by an LLM turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id; echoed back in the matching ToolResult.
    pub id: String,
    /// Tool name (e.g. "google_search", "transfer_to_mail").
    pub name: String,
    /// Arguments as a JSON string, exactly as returned by the model.
    pub arguments: String,
}

/// Result of executing one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the ToolCall this result answers.
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Plain-text tool output (or error string when the tool failed softly).
    pub content: String,
}

/// Shared state for the supervisor graph.
///
/// **Interaction**: SupervisorNode appends assistant messages and routes via
/// `active_agent`; WorkerNode executes `tool_calls`, appends `Message::Tool`
/// entries, and clears `active_agent` when handing back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupervisorState {
    /// Full conversation, including transfer and tool messages.
    pub messages: Vec<Message>,
    /// Worker currently holding the turn; None when the supervisor has it.
    pub active_agent: Option<String>,
    /// Tool calls pending execution by the active worker.
    pub tool_calls: Vec<ToolCall>,
    /// Results of the most recent tool execution.
    pub tool_results: Vec<ToolResult>,
    /// Supervisor turns taken in this run; bounds delegation loops.
    pub turn_count: u32,
}

impl SupervisorState {
    /// State seeded with a single user message; the usual entry point.
    pub fn from_user_message(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::User(text.into())],
            ..Self::default()
        }
    }

    /// Last assistant message content, if any. Used as the final answer.
    pub fn final_answer(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Assistant(s) => Some(s.as_str()),
            _ => None,
        })
    }
}
