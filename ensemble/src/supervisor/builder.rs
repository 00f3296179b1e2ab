//! Wires the supervisor star graph from a registry of agents.

use std::sync::Arc;

use crate::agents::{Agent, AgentRegistry, RegistryError};
use crate::checkpoint::Checkpointer;
use crate::graph::{CompilationError, CompiledStateGraph, StateGraph, END, START};
use crate::llm::LlmClient;
use crate::state::SupervisorState;
use crate::supervisor::{SupervisorNode, SUPERVISOR_NODE};

/// Builds a supervisor graph: one hub node plus one spoke per registered
/// agent. Spokes sit off the spine and are reached only by transfer jumps.
pub struct GraphBuilder {
    registry: AgentRegistry,
    supervisor_llm: Arc<dyn LlmClient>,
    worker_llm: Arc<dyn LlmClient>,
    checkpointer: Option<Arc<dyn Checkpointer<SupervisorState>>>,
    max_turns: Option<u32>,
}

impl GraphBuilder {
    /// Uses `llm` for both the supervisor and every worker.
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            registry: AgentRegistry::new(),
            supervisor_llm: llm.clone(),
            worker_llm: llm,
            checkpointer: None,
            max_turns: None,
        }
    }

    /// Separate client for the supervisor's routing turns (it carries the
    /// transfer tool specs when using a real provider).
    pub fn with_supervisor_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.supervisor_llm = llm;
        self
    }

    pub fn with_worker_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.worker_llm = llm;
        self
    }

    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer<SupervisorState>>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Registers an agent; names must be unique.
    pub fn register(mut self, agent: Arc<dyn Agent>) -> Result<Self, RegistryError> {
        self.registry.register(agent)?;
        Ok(self)
    }

    /// (name, summary) pairs in registration order; feeds the supervisor
    /// prompt and the transfer tool specs.
    pub fn agent_catalog(&self) -> Vec<(String, String)> {
        self.registry
            .agents()
            .iter()
            .map(|a| (a.name().to_string(), a.summary().to_string()))
            .collect()
    }

    pub fn build(self) -> Result<CompiledStateGraph<SupervisorState>, CompilationError> {
        let catalog = self.agent_catalog();
        let mut supervisor = SupervisorNode::new(self.supervisor_llm, &catalog);
        if let Some(max_turns) = self.max_turns {
            supervisor = supervisor.with_max_turns(max_turns);
        }

        let mut graph = StateGraph::new();
        graph.add_node(SUPERVISOR_NODE, Arc::new(supervisor));
        for agent in self.registry.agents() {
            graph.add_node(agent.name(), agent.build(self.worker_llm.clone()));
        }
        graph.add_edge(START, SUPERVISOR_NODE);
        graph.add_edge(SUPERVISOR_NODE, END);

        match self.checkpointer {
            Some(cp) => graph.compile_with_checkpointer(cp),
            None => graph.compile(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::RecallAgent;
    use crate::llm::MockLlm;
    use crate::recall::{HashEmbedder, InMemoryIndex, MemoryService};

    fn recall_agent() -> Arc<dyn Agent> {
        Arc::new(RecallAgent::new(MemoryService::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(InMemoryIndex::new()),
        )))
    }

    /// **Scenario**: A built graph delegates to a registered agent and comes
    /// back with a final answer.
    #[tokio::test]
    async fn built_graph_runs_delegation_round_trip() {
        let llm = Arc::new(
            MockLlm::new()
                .push_tool_call("", "transfer_to_recall", "{}")
                .push_text("nothing relevant in memory")
                .push_text("I checked memory; nothing relevant."),
        );
        let graph = GraphBuilder::new(llm)
            .register(recall_agent())
            .unwrap()
            .build()
            .unwrap();

        let state = graph
            .invoke(SupervisorState::from_user_message("what did we decide?"), None)
            .await
            .unwrap();
        assert_eq!(
            state.final_answer(),
            Some("I checked memory; nothing relevant.")
        );
        assert_eq!(state.turn_count, 2);
    }

    /// **Scenario**: Under Messages mode, the supervisor's answer arrives as
    /// a chunk tagged with its node id.
    #[tokio::test]
    async fn stream_emits_supervisor_message_chunks() {
        use crate::stream::{StreamEvent, StreamMode};
        use tokio_stream::StreamExt;

        let llm = Arc::new(MockLlm::new().push_text("streamed answer"));
        let graph = GraphBuilder::new(llm).build().unwrap();

        let mut stream = graph.stream(
            SupervisorState::from_user_message("hi"),
            None,
            [StreamMode::Messages],
        );
        let mut chunks = Vec::new();
        while let Some(event) = stream.next().await {
            if let StreamEvent::Messages { chunk, metadata } = event {
                chunks.push((metadata.node, chunk.content));
            }
        }
        assert_eq!(
            chunks,
            vec![("supervisor".to_string(), "streamed answer".to_string())]
        );
    }

    /// **Scenario**: With no agents registered, the supervisor alone still answers.
    #[tokio::test]
    async fn empty_registry_still_builds() {
        let llm = Arc::new(MockLlm::new().push_text("just me here"));
        let graph = GraphBuilder::new(llm).build().unwrap();
        let state = graph
            .invoke(SupervisorState::from_user_message("hi"), None)
            .await
            .unwrap();
        assert_eq!(state.final_answer(), Some("just me here"));
    }
}
