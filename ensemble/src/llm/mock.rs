//! Scripted LLM for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;

/// Mock LLM: pops scripted responses in order; when the script runs out it
/// returns a plain "done" message so graphs always terminate.
///
/// **Interaction**: Implements `LlmClient`; used by supervisor/worker nodes
/// in tests and by the CLI's `--mock` mode.
pub struct MockLlm {
    script: Mutex<VecDeque<(String, Vec<ToolCall>)>>,
}

impl MockLlm {
    /// Mock with an empty script: every invoke answers "done".
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a plain assistant response.
    pub fn push_text(self, content: impl Into<String>) -> Self {
        self.push(content, Vec::new())
    }

    /// Queue a response carrying tool calls.
    pub fn push_tool_call(
        self,
        content: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        let call = ToolCall {
            id: format!("mock-call-{}", self.len() + 1),
            name: name.into(),
            arguments: arguments.into(),
        };
        self.push(content, vec![call])
    }

    fn push(self, content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back((content.into(), tool_calls));
        }
        self
    }

    fn len(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, _messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let mut script = self
            .script
            .lock()
            .map_err(|e| AgentError::ExecutionFailed(e.to_string()))?;
        let (content, tool_calls) = script
            .pop_front()
            .unwrap_or_else(|| ("done".to_string(), Vec::new()));
        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }
}
