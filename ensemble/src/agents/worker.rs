//! Generic worker node: one agent's LLM loop plus its tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::{SupervisorState, ToolResult};
use crate::stream::{StreamEvent, StreamMode};
use crate::supervisor::SUPERVISOR_NODE;
use crate::tools::Tool;

/// Tool turns a worker may take before it must answer.
const MAX_TOOL_TURNS: usize = 5;

/// Runs one agent: scoped instructions, one tool, a bounded act/observe loop.
///
/// **Interaction**: Reached from the supervisor via `Next::Node(name)`;
/// always hands the turn back with `Next::Node("supervisor")`.
pub struct WorkerNode {
    name: String,
    instructions: String,
    tool: Arc<dyn Tool>,
    llm: Arc<dyn LlmClient>,
}

impl WorkerNode {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        tool: Arc<dyn Tool>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tool,
            llm,
        }
    }

    /// Extracts the tool input from the model's JSON arguments. Falls back to
    /// the raw string when the arguments are not `{"input": ...}`.
    fn tool_input(arguments: &str) -> String {
        serde_json::from_str::<Value>(arguments)
            .ok()
            .and_then(|v| v["input"].as_str().map(str::to_string))
            .unwrap_or_else(|| arguments.trim().to_string())
    }

    /// Streams one tool observation as a Custom event when that mode is on.
    async fn emit_observation(
        &self,
        ctx: Option<&RunContext<SupervisorState>>,
        tool: &str,
        observation: &str,
    ) {
        let Some(ctx) = ctx else { return };
        if !ctx.stream_mode.contains(&StreamMode::Custom) {
            return;
        }
        if let Some(tx) = &ctx.stream_tx {
            let _ = tx
                .send(StreamEvent::Custom(json!({
                    "agent": self.name,
                    "tool": tool,
                    "observation": observation,
                })))
                .await;
        }
    }

    async fn step(
        &self,
        mut state: SupervisorState,
        ctx: Option<&RunContext<SupervisorState>>,
    ) -> Result<(SupervisorState, Next), AgentError> {
        let mut prompt = Vec::with_capacity(state.messages.len() + 1);
        prompt.push(Message::System(self.instructions.clone()));
        prompt.extend(state.messages.iter().cloned());

        let mut answer = String::new();
        for turn in 0..=MAX_TOOL_TURNS {
            let response = self.llm.invoke(&prompt).await?;
            if response.tool_calls.is_empty() {
                answer = response.content;
                break;
            }
            if turn == MAX_TOOL_TURNS {
                warn!(agent = %self.name, "tool turn budget exhausted");
                answer = response.content;
                break;
            }
            state.tool_calls = response.tool_calls.clone();
            for call in response.tool_calls {
                let input = Self::tool_input(&call.arguments);
                debug!(agent = %self.name, tool = %call.name, %input, "tool call");
                // Tool failures go back to the model as observations.
                let content = match self.tool.call(&input).await {
                    Ok(output) => output,
                    Err(e) => format!("Error: {}", e),
                };
                self.emit_observation(ctx, &call.name, &content).await;
                state.tool_results.push(ToolResult {
                    call_id: call.id,
                    name: call.name,
                    content: content.clone(),
                });
                let observation = Message::Tool {
                    name: self.tool.name().to_string(),
                    content,
                };
                prompt.push(observation.clone());
                state.messages.push(observation);
            }
            state.tool_calls.clear();
        }

        if !answer.is_empty() {
            state.messages.push(Message::Tool {
                name: self.name.clone(),
                content: answer,
            });
        }
        state.active_agent = None;
        Ok((state, Next::Node(SUPERVISOR_NODE.to_string())))
    }
}

#[async_trait]
impl Node<SupervisorState> for WorkerNode {
    fn id(&self) -> &str {
        &self.name
    }

    async fn run(&self, state: SupervisorState) -> Result<(SupervisorState, Next), AgentError> {
        self.step(state, None).await
    }

    async fn run_with_context(
        &self,
        state: SupervisorState,
        ctx: &RunContext<SupervisorState>,
    ) -> Result<(SupervisorState, Next), AgentError> {
        self.step(state, Some(ctx)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::tools::ToolError;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        async fn call(&self, input: &str) -> Result<String, ToolError> {
            if input == "boom" {
                return Err(ToolError::Api("down".into()));
            }
            Ok(format!("echo: {}", input))
        }
    }

    fn worker(llm: MockLlm) -> WorkerNode {
        WorkerNode::new("echoer", "You echo things.", Arc::new(EchoTool), Arc::new(llm))
    }

    /// **Scenario**: A tool call turn executes the tool, records the
    /// observation, and the follow-up answer goes back to the supervisor.
    #[tokio::test]
    async fn tool_call_then_answer() {
        let llm = MockLlm::new()
            .push_tool_call("", "echo", r#"{"input": "hello"}"#)
            .push_text("it said hello back");
        let node = worker(llm);

        let state = SupervisorState::from_user_message("say hello");
        let (state, next) = node.run(state).await.unwrap();

        assert_eq!(next, Next::Node("supervisor".into()));
        assert!(state.active_agent.is_none());
        assert_eq!(state.tool_results.len(), 1);
        assert_eq!(state.tool_results[0].content, "echo: hello");
        let texts: Vec<_> = state.messages.iter().map(|m| m.content()).collect();
        assert!(texts.contains(&"echo: hello"));
        assert!(texts.contains(&"it said hello back"));
    }

    /// **Scenario**: Tool failure is handed to the model as an observation,
    /// not an aborted run.
    #[tokio::test]
    async fn tool_failure_becomes_observation() {
        let llm = MockLlm::new()
            .push_tool_call("", "echo", r#"{"input": "boom"}"#)
            .push_text("the tool is down");
        let node = worker(llm);

        let (state, _) = node
            .run(SupervisorState::from_user_message("try it"))
            .await
            .unwrap();
        assert!(state.tool_results[0].content.starts_with("Error:"));
    }

    /// **Scenario**: Non-JSON arguments are passed through raw.
    #[test]
    fn raw_arguments_pass_through() {
        assert_eq!(WorkerNode::tool_input(r#"{"input": "a:b"}"#), "a:b");
        assert_eq!(WorkerNode::tool_input("list_events:3"), "list_events:3");
    }

    /// **Scenario**: Under Custom mode, each tool observation is streamed as
    /// it happens, tagged with the agent and tool names.
    #[tokio::test]
    async fn custom_mode_streams_tool_observations() {
        use crate::checkpoint::RunnableConfig;

        let llm = MockLlm::new()
            .push_tool_call("", "echo", r#"{"input": "hello"}"#)
            .push_text("it said hello back");
        let node = worker(llm);

        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let ctx = RunContext {
            config: RunnableConfig::default(),
            stream_tx: Some(tx),
            stream_mode: [StreamMode::Custom].into(),
        };
        node.run_with_context(SupervisorState::from_user_message("say hello"), &ctx)
            .await
            .unwrap();
        drop(ctx);

        let StreamEvent::Custom(payload) = rx.recv().await.unwrap() else {
            panic!("expected a Custom event");
        };
        assert_eq!(payload["agent"], "echoer");
        assert_eq!(payload["tool"], "echo");
        assert_eq!(payload["observation"], "echo: hello");
        assert!(rx.recv().await.is_none());
    }
}
