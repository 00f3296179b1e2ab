//! Workflow history: list past checkpoints, resume a thread, branch from an
//! earlier point with an edited prompt.
//!
//! Wraps a compiled supervisor graph and its checkpointer. Listing is a view
//! over `Checkpointer::list`; branching loads the chosen snapshot, swaps the
//! last user prompt, writes a Fork checkpoint, and re-streams the run.

use std::collections::HashSet;

use thiserror::Error;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::checkpoint::{
    Checkpoint, CheckpointError, CheckpointSource, Checkpointer, RunnableConfig,
};
use crate::graph::CompiledStateGraph;
use crate::message::Message;
use crate::state::SupervisorState;
use crate::stream::{StreamEvent, StreamMode};

/// One entry in a thread's history, newest first.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub checkpoint_id: String,
    pub source: CheckpointSource,
    pub step: u64,
    pub created_at: Option<std::time::SystemTime>,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    /// The requested checkpoint does not exist on this thread.
    #[error("unknown checkpoint: {0}")]
    UnknownCheckpoint(String),
    /// The graph was compiled without a checkpointer.
    #[error("graph has no checkpointer; history is unavailable")]
    NoCheckpointer,
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

/// History and branching over one supervisor graph.
///
/// **Interaction**: The server's `/workflow` routes and the CLI's `history` /
/// `branch` commands are thin wrappers over this.
#[derive(Clone)]
pub struct WorkflowHistory {
    graph: CompiledStateGraph<SupervisorState>,
    checkpointer: std::sync::Arc<dyn Checkpointer<SupervisorState>>,
}

impl WorkflowHistory {
    /// Fails when the graph has no checkpointer to read history from.
    pub fn new(graph: CompiledStateGraph<SupervisorState>) -> Result<Self, HistoryError> {
        let checkpointer = graph
            .checkpointer()
            .cloned()
            .ok_or(HistoryError::NoCheckpointer)?;
        Ok(Self {
            graph,
            checkpointer,
        })
    }

    pub fn graph(&self) -> &CompiledStateGraph<SupervisorState> {
        &self.graph
    }

    fn checkpointer(&self) -> &dyn Checkpointer<SupervisorState> {
        self.checkpointer.as_ref()
    }

    /// Thread history, newest first.
    pub async fn state_history(
        &self,
        config: &RunnableConfig,
    ) -> Result<Vec<StateSnapshot>, HistoryError> {
        let items = self.checkpointer().list(config).await?;
        Ok(items
            .into_iter()
            .map(|item| StateSnapshot {
                checkpoint_id: item.checkpoint_id,
                source: item.metadata.source,
                step: item.metadata.step,
                created_at: item.metadata.created_at,
            })
            .collect())
    }

    /// Full state at a specific checkpoint.
    pub async fn load(
        &self,
        config: &RunnableConfig,
        checkpoint_id: &str,
    ) -> Result<SupervisorState, HistoryError> {
        let at = config.at_checkpoint(checkpoint_id);
        let checkpoint = self.checkpointer().get_tuple(&at).await?;
        match checkpoint {
            Some(cp) => Ok(cp.channel_values),
            None => Err(HistoryError::UnknownCheckpoint(checkpoint_id.to_string())),
        }
    }

    /// State to feed the next run on this thread: the latest snapshot with the
    /// new user prompt appended, or a fresh state when the thread is new.
    pub async fn resume_state(
        &self,
        config: &RunnableConfig,
        prompt: &str,
    ) -> Result<SupervisorState, HistoryError> {
        let latest = RunnableConfig {
            checkpoint_id: None,
            ..config.clone()
        };
        match self.checkpointer().get_tuple(&latest).await? {
            Some(cp) => {
                let mut state = cp.channel_values;
                state.messages.push(Message::User(prompt.to_string()));
                state.active_agent = None;
                state.tool_calls.clear();
                state.tool_results.clear();
                state.turn_count = 0;
                Ok(state)
            }
            None => Ok(SupervisorState::from_user_message(prompt)),
        }
    }

    /// Continues the thread with a new user prompt, streaming the run.
    pub async fn chat(
        &self,
        config: &RunnableConfig,
        prompt: &str,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> Result<ReceiverStream<StreamEvent<SupervisorState>>, HistoryError> {
        let state = self.resume_state(config, prompt).await?;
        Ok(self.graph.stream(state, Some(config.clone()), stream_mode))
    }

    /// Branches from `checkpoint_id`: replaces the last user prompt of that
    /// snapshot with `new_prompt`, writes a Fork checkpoint marking the branch
    /// point, and re-streams the run from there.
    pub async fn update(
        &self,
        config: &RunnableConfig,
        checkpoint_id: &str,
        new_prompt: &str,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> Result<ReceiverStream<StreamEvent<SupervisorState>>, HistoryError> {
        let mut state = self.load(config, checkpoint_id).await?;

        // Drop everything from the last user message onward, then re-ask.
        if let Some(pos) = state
            .messages
            .iter()
            .rposition(|m| matches!(m, Message::User(_)))
        {
            state.messages.truncate(pos);
        }
        state.messages.push(Message::User(new_prompt.to_string()));
        state.active_agent = None;
        state.tool_calls.clear();
        state.tool_results.clear();
        state.turn_count = 0;

        let fork_step = self
            .checkpointer()
            .get_tuple(&RunnableConfig {
                checkpoint_id: None,
                ..config.clone()
            })
            .await?
            .map(|latest| latest.metadata.step + 1)
            .unwrap_or(0);
        let fork = Checkpoint::from_state(state.clone(), CheckpointSource::Fork, fork_step);
        self.checkpointer().put(config, &fork).await?;
        info!(
            checkpoint_id,
            fork_id = %fork.id,
            "branched workflow from checkpoint"
        );

        Ok(self.graph.stream(state, Some(config.clone()), stream_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio_stream::StreamExt;

    use crate::checkpoint::MemorySaver;
    use crate::llm::MockLlm;
    use crate::supervisor::GraphBuilder;

    fn history_with_script(llm: MockLlm) -> WorkflowHistory {
        let graph = GraphBuilder::new(Arc::new(llm))
            .with_checkpointer(Arc::new(MemorySaver::new()))
            .build()
            .unwrap();
        WorkflowHistory::new(graph).unwrap()
    }

    async fn final_state(
        mut stream: ReceiverStream<StreamEvent<SupervisorState>>,
    ) -> SupervisorState {
        let mut last = None;
        while let Some(event) = stream.next().await {
            if let StreamEvent::Values(state) = event {
                last = Some(state);
            }
        }
        last.expect("stream produced at least one Values event")
    }

    /// **Scenario**: A run leaves Input + Loop checkpoints, newest first.
    #[tokio::test]
    async fn state_history_lists_run_checkpoints() {
        let history = history_with_script(MockLlm::new().push_text("answer one"));
        let config = RunnableConfig::for_thread("t1");

        let stream = history.chat(&config, "question", [StreamMode::Values]).await.unwrap();
        let state = final_state(stream).await;
        assert_eq!(state.final_answer(), Some("answer one"));

        let snapshots = history.state_history(&config).await.unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].source, CheckpointSource::Loop);
        assert_eq!(snapshots[1].source, CheckpointSource::Input);
        assert_eq!(snapshots[1].step, 0);
    }

    /// **Scenario**: Branching from the Input checkpoint swaps the prompt and
    /// replays, leaving a Fork checkpoint at the branch point.
    #[tokio::test]
    async fn update_branches_with_new_prompt() {
        let history = history_with_script(
            MockLlm::new().push_text("answer one").push_text("answer two"),
        );
        let config = RunnableConfig::for_thread("t1");

        let stream = history.chat(&config, "first question", [StreamMode::Values]).await.unwrap();
        final_state(stream).await;

        let snapshots = history.state_history(&config).await.unwrap();
        let input_id = snapshots
            .iter()
            .find(|s| s.source == CheckpointSource::Input)
            .map(|s| s.checkpoint_id.clone())
            .unwrap();

        let stream = history
            .update(&config, &input_id, "second question", [StreamMode::Values])
            .await
            .unwrap();
        let state = final_state(stream).await;
        assert_eq!(state.final_answer(), Some("answer two"));
        assert_eq!(state.messages[0], Message::User("second question".into()));
        assert!(!state
            .messages
            .iter()
            .any(|m| m.content().contains("first question")));

        let snapshots = history.state_history(&config).await.unwrap();
        assert!(snapshots
            .iter()
            .any(|s| s.source == CheckpointSource::Fork));
    }

    /// **Scenario**: Branching from an id that never existed is a typed error.
    #[tokio::test]
    async fn update_unknown_checkpoint_is_typed_error() {
        let history = history_with_script(MockLlm::new());
        let config = RunnableConfig::for_thread("t1");
        let err = history
            .update(&config, "no-such-id", "prompt", [StreamMode::Values])
            .await
            .unwrap_err();
        match err {
            HistoryError::UnknownCheckpoint(id) => assert_eq!(id, "no-such-id"),
            other => panic!("expected UnknownCheckpoint, got {:?}", other),
        }
    }

    /// **Scenario**: A second chat on the same thread resumes the conversation.
    #[tokio::test]
    async fn chat_resumes_thread() {
        let history = history_with_script(
            MockLlm::new().push_text("hello there").push_text("still here"),
        );
        let config = RunnableConfig::for_thread("t1");

        let stream = history.chat(&config, "hi", [StreamMode::Values]).await.unwrap();
        final_state(stream).await;

        let stream = history.chat(&config, "you there?", [StreamMode::Values]).await.unwrap();
        let state = final_state(stream).await;
        // Both user prompts and both answers live on the same thread.
        assert_eq!(state.messages.len(), 4);
        assert_eq!(state.final_answer(), Some("still here"));
    }
}
