//! The supervisor's own graph node.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::SupervisorState;
use crate::stream::{MessageChunk, StreamEvent, StreamMetadata, StreamMode};
use crate::supervisor::{supervisor_prompt, SUPERVISOR_NODE, TRANSFER_PREFIX};

/// Supervisor turns allowed per run before the conversation is cut off.
const DEFAULT_MAX_TURNS: u32 = 10;

/// Hub node: reads the conversation, then either delegates via a transfer
/// tool call or answers and ends the run.
pub struct SupervisorNode {
    llm: Arc<dyn LlmClient>,
    prompt: String,
    agent_names: Vec<String>,
    max_turns: u32,
}

impl SupervisorNode {
    /// `agents` are (name, summary) pairs in wiring order.
    pub fn new(llm: Arc<dyn LlmClient>, agents: &[(String, String)]) -> Self {
        Self {
            llm,
            prompt: supervisor_prompt(agents),
            agent_names: agents.iter().map(|(n, _)| n.clone()).collect(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    /// First transfer target in the response's tool calls, if any.
    fn transfer_target(&self, calls: &[crate::state::ToolCall]) -> Option<String> {
        calls.iter().find_map(|call| {
            call.name
                .strip_prefix(TRANSFER_PREFIX)
                .map(str::to_string)
        })
    }

    /// Streams the turn's content as a Messages chunk when that mode is on.
    async fn emit_content(&self, ctx: Option<&RunContext<SupervisorState>>, content: &str) {
        let Some(ctx) = ctx else { return };
        if content.is_empty() || !ctx.stream_mode.contains(&StreamMode::Messages) {
            return;
        }
        if let Some(tx) = &ctx.stream_tx {
            let _ = tx
                .send(StreamEvent::Messages {
                    chunk: MessageChunk {
                        content: content.to_string(),
                    },
                    metadata: StreamMetadata {
                        node: SUPERVISOR_NODE.to_string(),
                    },
                })
                .await;
        }
    }

    async fn step(
        &self,
        mut state: SupervisorState,
        ctx: Option<&RunContext<SupervisorState>>,
    ) -> Result<(SupervisorState, Next), AgentError> {
        state.turn_count += 1;
        if state.turn_count > self.max_turns {
            warn!(turns = state.turn_count, "supervisor turn budget exhausted");
            state.messages.push(Message::Assistant(
                "I could not finish this request within the allowed number of steps.".into(),
            ));
            return Ok((state, Next::End));
        }

        let mut prompt = Vec::with_capacity(state.messages.len() + 1);
        prompt.push(Message::System(self.prompt.clone()));
        prompt.extend(state.messages.iter().cloned());

        let response = self.llm.invoke(&prompt).await?;
        self.emit_content(ctx, &response.content).await;

        if let Some(target) = self.transfer_target(&response.tool_calls) {
            if !self.agent_names.iter().any(|n| n == &target) {
                return Err(AgentError::ExecutionFailed(format!(
                    "supervisor transferred to unknown agent: {}",
                    target
                )));
            }
            debug!(agent = %target, turn = state.turn_count, "supervisor delegates");
            if !response.content.is_empty() {
                state.messages.push(Message::Assistant(response.content));
            }
            state.active_agent = Some(target.clone());
            return Ok((state, Next::Node(target)));
        }

        debug!(turn = state.turn_count, "supervisor answers");
        state.messages.push(Message::Assistant(response.content));
        state.active_agent = None;
        Ok((state, Next::End))
    }
}

#[async_trait]
impl Node<SupervisorState> for SupervisorNode {
    fn id(&self) -> &str {
        SUPERVISOR_NODE
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
