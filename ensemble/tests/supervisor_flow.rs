//! Integration tests: full supervisor flows with scripted LLM turns.
//!
//! **Scenario**: GraphBuilder wires the star graph (supervisor + workers),
//! a scripted MockLlm drives delegation, tools run behind the worker, and
//! checkpoints capture every hop so history can list and branch the run.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_stream::StreamExt;

use ensemble::agents::{RecallAgent, SearchAgent};
use ensemble::checkpoint::{
    CheckpointSource, Checkpointer, JsonSerializer, MemorySaver, RunnableConfig, SqliteSaver,
};
use ensemble::history::WorkflowHistory;
use ensemble::llm::MockLlm;
use ensemble::recall::{HashEmbedder, InMemoryIndex, MemoryService};
use ensemble::state::SupervisorState;
use ensemble::stream::{StreamEvent, StreamMode};
use ensemble::supervisor::GraphBuilder;
use ensemble::tools::{Tool, ToolError};

/// Stand-in search tool: returns a canned result page.
struct FakeSearch;

#[async_trait]
impl Tool for FakeSearch {
    fn name(&self) -> &str {
        "gsearch"
    }
    fn description(&self) -> &str {
        "fake web search"
    }
    async fn call(&self, input: &str) -> Result<String, ToolError> {
        Ok(format!(
            "Rust 1.80 Release Notes\nhttps://blog.rust-lang.org\nquery was: {}",
            input
        ))
    }
}

fn memory_service() -> MemoryService {
    MemoryService::new(
        Arc::new(HashEmbedder::default()),
        Arc::new(InMemoryIndex::new()),
    )
}

/// Supervisor delegates to search, the worker calls its tool, reads the
/// observation, reports back, and the supervisor answers the user.
#[tokio::test]
async fn delegation_round_trip_with_tool_call() {
    let llm = Arc::new(
        MockLlm::new()
            // supervisor: route to the search agent
            .push_tool_call("", "transfer_to_search", "{}")
            // search worker: call the tool
            .push_tool_call("", "gsearch", r#"{"input": "rust 1.80 release"}"#)
            // search worker: read the observation, report back
            .push_text("Rust 1.80 notes are on the Rust blog.")
            // supervisor: final answer
            .push_text("Rust 1.80 release notes: see the Rust blog."),
    );
    let saver = Arc::new(MemorySaver::new());
    let graph = GraphBuilder::new(llm)
        .register(Arc::new(SearchAgent::new(Arc::new(FakeSearch))))
        .unwrap()
        .register(Arc::new(RecallAgent::new(memory_service())))
        .unwrap()
        .with_checkpointer(saver.clone())
        .build()
        .unwrap();

    let config = RunnableConfig::for_thread("t-search");
    let state = graph
        .invoke(
            SupervisorState::from_user_message("when was rust 1.80 released?"),
            Some(config.clone()),
        )
        .await
        .unwrap();

    assert_eq!(
        state.final_answer(),
        Some("Rust 1.80 release notes: see the Rust blog.")
    );
    assert_eq!(state.turn_count, 2);
    assert_eq!(state.tool_results.len(), 1);
    assert!(state.tool_results[0].content.contains("Rust 1.80 Release Notes"));
    assert!(state.active_agent.is_none());

    // Input + Loop per node step: supervisor, search, supervisor.
    let items = saver.list(&config).await.unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[3].metadata.source, CheckpointSource::Input);
    assert!(items[..3]
        .iter()
        .all(|i| i.metadata.source == CheckpointSource::Loop));
}

/// History over a SQLite-backed graph: chat, list, branch with an edited
/// prompt, and get a different answer on the fork.
#[tokio::test]
async fn branch_and_replay_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let saver = Arc::new(
        SqliteSaver::open(dir.path().join("cp.db"), Arc::new(JsonSerializer)).unwrap(),
    );
    let llm = Arc::new(
        MockLlm::new()
            .push_text("the meeting is on monday")
            .push_text("the meeting is on tuesday"),
    );
    let graph = GraphBuilder::new(llm)
        .with_checkpointer(saver)
        .build()
        .unwrap();
    let history = WorkflowHistory::new(graph).unwrap();
    let config = RunnableConfig::for_thread("t-branch");

    let mut stream = history
        .chat(&config, "when is the meeting?", [StreamMode::Values])
        .await
        .unwrap();
    let mut last = None;
    while let Some(event) = stream.next().await {
        if let StreamEvent::Values(state) = event {
            last = Some(state);
        }
    }
    assert_eq!(
        last.unwrap().final_answer(),
        Some("the meeting is on monday")
    );

    let snapshots = history.state_history(&config).await.unwrap();
    let input_id = snapshots
        .iter()
        .find(|s| s.source == CheckpointSource::Input)
        .map(|s| s.checkpoint_id.clone())
        .unwrap();

    let mut stream = history
        .update(
            &config,
            &input_id,
            "when is the rescheduled meeting?",
            [StreamMode::Values],
        )
        .await
        .unwrap();
    let mut last = None;
    while let Some(event) = stream.next().await {
        if let StreamEvent::Values(state) = event {
            last = Some(state);
        }
    }
    let forked = last.unwrap();
    assert_eq!(forked.final_answer(), Some("the meeting is on tuesday"));
    assert_eq!(
        forked.messages[0].content(),
        "when is the rescheduled meeting?"
    );

    let snapshots = history.state_history(&config).await.unwrap();
    assert!(snapshots.iter().any(|s| s.source == CheckpointSource::Fork));
}

/// The recall agent answers from what the memory service indexed earlier.
#[tokio::test]
async fn recall_agent_reads_memory() {
    let memory = memory_service();
    memory
        .remember_conversation(&[
            "we chose postgres over mysql for the billing service".to_string(),
        ])
        .await
        .unwrap();

    let llm = Arc::new(
        MockLlm::new()
            .push_tool_call("", "transfer_to_recall", "{}")
            .push_tool_call("", "recall", r#"{"input": "billing database choice"}"#)
            .push_text("We picked postgres for billing.")
            .push_text("You chose postgres for the billing service."),
    );
    let graph = GraphBuilder::new(llm)
        .register(Arc::new(RecallAgent::new(memory)))
        .unwrap()
        .build()
        .unwrap();

    let state = graph
        .invoke(
            SupervisorState::from_user_message("which database did we pick?"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(
        state.final_answer(),
        Some("You chose postgres for the billing service.")
    );
    assert!(state.tool_results[0].content.contains("postgres"));
}
