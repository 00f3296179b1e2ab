//! LLM client abstraction for supervisor and worker turns.
//!
//! A node depends on a callable that returns assistant text and optional
//! tool calls; this module defines the trait, the tool spec passed to the
//! model, and a mock implementation for tests.

mod mock;

#[cfg(feature = "openai")]
mod openai;

pub use mock::MockLlm;

#[cfg(feature = "openai")]
pub use openai::{ChatOpenAI, OpenAIEmbedder};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;
use crate::message::Message;
use crate::state::ToolCall;

/// Tool description handed to the model for function calling.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool input.
    pub input_schema: Value,
}

impl ToolSpec {
    /// Spec whose input is a single free-text field, the common shape here:
    /// every wrapped tool takes one `input` string in `operation:args` form.
    pub fn text_input(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "input": { "type": "string" }
                },
                "required": ["input"]
            }),
        }
    }
}

/// Tool choice mode for chat completions: when tools are present, controls
/// whether the model may choose (auto), must not use (none), or must use (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    /// Model can pick between message or tool calls. Default when tools are present.
    #[default]
    Auto,
    /// Model will not call any tool.
    None,
    /// Model must call one or more tools.
    Required,
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, or required)",
                s
            )),
        }
    }
}

/// Response from an LLM completion: assistant message text and optional tool calls.
///
/// **Interaction**: Returned by `LlmClient::invoke()`; the supervisor routes
/// on `tool_calls` (transfer tools), workers execute them.
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Tool calls from this turn; empty means the turn is a final answer.
    pub tool_calls: Vec<ToolCall>,
}

/// LLM client: given messages, returns assistant text and optional tool_calls.
///
/// Implementations: `MockLlm` (scripted responses), `ChatOpenAI` (real API,
/// feature `openai`).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content and optional tool_calls.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    /// **Scenario**: ToolChoiceMode parses all accepted strings case-insensitively, rejects others.
    #[test]
    fn tool_choice_mode_from_str() {
        assert_eq!(ToolChoiceMode::from_str("auto").unwrap(), ToolChoiceMode::Auto);
        assert_eq!(ToolChoiceMode::from_str("NONE").unwrap(), ToolChoiceMode::None);
        assert_eq!(
            ToolChoiceMode::from_str("Required").unwrap(),
            ToolChoiceMode::Required
        );
        assert!(ToolChoiceMode::from_str("maybe").is_err());
    }

    /// **Scenario**: text_input specs require a single "input" string property.
    #[test]
    fn tool_spec_text_input_schema() {
        let spec = ToolSpec::text_input("gmail", "mail ops");
        assert_eq!(spec.name, "gmail");
        assert_eq!(spec.input_schema["required"][0], "input");
        assert_eq!(spec.input_schema["properties"]["input"]["type"], "string");
    }
}
