//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. Holds nodes
//! and the Continue spine (derived from explicit edges at compile time), plus
//! an optional checkpointer.
//!
//! When a checkpointer is set and `config.thread_id` is provided, an Input
//! checkpoint is written before the first node and a Loop checkpoint after
//! every node step, so history captures each supervisor hop. Steps number
//! monotonically across runs on the same thread.
//!
//! The graph only writes checkpoints; loading a saved snapshot (resume, time
//! travel, branching) is `WorkflowHistory`'s job, which restores the state
//! itself and then invokes or streams the graph with it.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

use crate::checkpoint::{Checkpoint, CheckpointSource, Checkpointer, RunnableConfig};
use crate::error::AgentError;
use crate::stream::{StreamEvent, StreamMode};

use super::next::Next;
use super::node::Node;
use super::run_context::RunContext;

/// Compiled graph: immutable structure, supports invoke and stream.
///
/// Runs from the first node on the spine; each node's returned `Next` chooses
/// the next node. `Next::Node(id)` may target any registered node, including
/// off-spine workers.
#[derive(Clone)]
pub struct CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edge_order: Vec<String>,
    checkpointer: Option<Arc<dyn Checkpointer<S>>>,
}

impl<S> Debug for CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledStateGraph")
            .field("edge_order", &self.edge_order)
            .finish_non_exhaustive()
    }
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub(super) fn new(
        nodes: HashMap<String, Arc<dyn Node<S>>>,
        edge_order: Vec<String>,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Self {
        Self {
            nodes,
            edge_order,
            checkpointer,
        }
    }

    /// The checkpointer this graph was compiled with, if any.
    ///
    /// **Interaction**: `WorkflowHistory` reads it for `list`/`get_tuple`.
    pub fn checkpointer(&self) -> Option<&Arc<dyn Checkpointer<S>>> {
        self.checkpointer.as_ref()
    }

    /// Next step number for a thread: one past the latest persisted step.
    async fn next_step(&self, config: &RunnableConfig) -> u64 {
        let Some(cp) = &self.checkpointer else {
            return 0;
        };
        let latest_cfg = RunnableConfig {
            checkpoint_id: None,
            ..config.clone()
        };
        match cp.get_tuple(&latest_cfg).await {
            Ok(Some(latest)) => latest.metadata.step + 1,
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "checkpoint lookup failed; starting steps at 0");
                0
            }
        }
    }

    /// Writes one checkpoint; failures are logged, never fatal to the run.
    async fn save_checkpoint(
        &self,
        config: &RunnableConfig,
        state: &S,
        source: CheckpointSource,
        step: u64,
    ) {
        if let Some(cp) = &self.checkpointer {
            let checkpoint = Checkpoint::from_state(state.clone(), source, step);
            if let Err(e) = cp.put(config, &checkpoint).await {
                warn!(error = %e, step, "failed to save checkpoint");
            }
        }
    }

    /// Shared run loop used by invoke() and stream(): steps through nodes
    /// until completion, checkpointing after each step.
    async fn run_loop_inner(
        &self,
        state: &mut S,
        config: &Option<RunnableConfig>,
        current_id: &mut String,
        run_ctx: Option<&RunContext<S>>,
    ) -> Result<(), AgentError> {
        let checkpoint_cfg = config
            .as_ref()
            .filter(|c| c.thread_id.is_some() && self.checkpointer.is_some())
            .cloned();

        let mut step = match &checkpoint_cfg {
            Some(cfg) => {
                let step = self.next_step(cfg).await;
                self.save_checkpoint(cfg, state, CheckpointSource::Input, step)
                    .await;
                step + 1
            }
            None => 0,
        };

        loop {
            let node = self
                .nodes
                .get(current_id)
                .ok_or_else(|| {
                    AgentError::ExecutionFailed(format!("unknown node: {}", current_id))
                })?
                .clone();
            let current_state = state.clone();

            let (new_state, next) = if let Some(ctx) = run_ctx {
                node.run_with_context(current_state, ctx).await?
            } else {
                node.run(current_state).await?
            };

            *state = new_state;

            if let Some(cfg) = &checkpoint_cfg {
                self.save_checkpoint(cfg, state, CheckpointSource::Loop, step)
                    .await;
                step += 1;
            }

            if let Some(ctx) = run_ctx {
                if let Some(tx) = &ctx.stream_tx {
                    if ctx.stream_mode.contains(&StreamMode::Values) {
                        let _ = tx.send(StreamEvent::Values(state.clone())).await;
                    }
                    if ctx.stream_mode.contains(&StreamMode::Updates) {
                        let _ = tx
                            .send(StreamEvent::Updates {
                                node_id: current_id.clone(),
                                state: state.clone(),
                            })
                            .await;
                    }
                }
            }

            match next {
                Next::End => return Ok(()),
                Next::Node(id) => {
                    if !self.nodes.contains_key(&id) {
                        return Err(AgentError::ExecutionFailed(format!(
                            "jump to unknown node: {}",
                            id
                        )));
                    }
                    *current_id = id;
                }
                Next::Continue => {
                    let pos = self
                        .edge_order
                        .iter()
                        .position(|x| x == current_id)
                        .ok_or_else(|| {
                            AgentError::ExecutionFailed(format!(
                                "node '{}' is off the spine; it must return Next::Node or Next::End",
                                current_id
                            ))
                        })?;
                    let next_pos = pos + 1;
                    if next_pos >= self.edge_order.len() {
                        return Ok(());
                    }
                    *current_id = self.edge_order[next_pos].clone();
                }
            }
        }
    }

    /// Runs the graph with the given state. Starts at the first node on the
    /// spine; after each node, uses the returned `Next`.
    ///
    /// When `config` has `thread_id` and the graph was compiled with a
    /// checkpointer, every step is checkpointed. Pass `None` for config to run
    /// without persistence.
    pub async fn invoke(&self, state: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        let mut state = state;
        let mut current_id = self
            .edge_order
            .first()
            .cloned()
            .ok_or_else(|| AgentError::ExecutionFailed("empty graph".into()))?;

        self.run_loop_inner(&mut state, &config, &mut current_id, None)
            .await?;

        Ok(state)
    }

    /// Streams graph execution, emitting events via a channel-backed Stream.
    ///
    /// The run itself executes on a spawned task; dropping the stream cancels
    /// delivery but not checkpointing of steps already taken.
    pub fn stream(
        &self,
        state: S,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let mode_set: HashSet<StreamMode> = stream_mode.into();

        tokio::spawn(async move {
            let mut state = state;
            let mut current_id = match graph.edge_order.first().cloned() {
                Some(id) => id,
                None => return,
            };
            let run_ctx = RunContext {
                config: config.clone().unwrap_or_default(),
                stream_tx: Some(tx),
                stream_mode: mode_set,
            };

            if let Err(e) = graph
                .run_loop_inner(&mut state, &config, &mut current_id, Some(&run_ctx))
                .await
            {
                warn!(error = %e, "streamed run failed");
            }
        });

        ReceiverStream::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio_stream::StreamExt;

    use crate::checkpoint::MemorySaver;
    use crate::graph::{StateGraph, END, START};

    /// **Scenario**: invoke on an empty graph returns ExecutionFailed("empty graph").
    #[tokio::test]
    async fn invoke_empty_graph_returns_execution_failed() {
        let graph = CompiledStateGraph::<i32>::new(HashMap::new(), vec![], None);
        match graph.invoke(0, None).await {
            Err(AgentError::ExecutionFailed(msg)) => assert!(msg.contains("empty graph")),
            other => panic!("expected ExecutionFailed, got {:?}", other),
        }
    }

    #[derive(Clone)]
    struct AddNode {
        id: &'static str,
        delta: i32,
    }

    #[async_trait]
    impl Node<i32> for AddNode {
        fn id(&self) -> &str {
            self.id
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state + self.delta, Next::Continue))
        }
    }

    /// Hub node: jumps to "worker" until state >= 10, then ends.
    #[derive(Clone)]
    struct HubNode;

    #[async_trait]
    impl Node<i32> for HubNode {
        fn id(&self) -> &str {
            "hub"
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            if state >= 10 {
                Ok((state, Next::End))
            } else {
                Ok((state, Next::Node("worker".into())))
            }
        }
    }

    /// Worker node: adds 5 then hands back to the hub.
    #[derive(Clone)]
    struct BackNode;

    #[async_trait]
    impl Node<i32> for BackNode {
        fn id(&self) -> &str {
            "worker"
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state + 5, Next::Node("hub".into())))
        }
    }

    fn linear_graph() -> CompiledStateGraph<i32> {
        let mut g = StateGraph::<i32>::new();
        g.add_node("first", Arc::new(AddNode { id: "first", delta: 1 }));
        g.add_node("second", Arc::new(AddNode { id: "second", delta: 2 }));
        g.add_edge(START, "first");
        g.add_edge("first", "second");
        g.add_edge("second", END);
        g.compile().expect("graph compiles")
    }

    /// **Scenario**: Linear two-node graph applies both nodes in order.
    #[tokio::test]
    async fn invoke_linear_graph() {
        let graph = linear_graph();
        assert_eq!(graph.invoke(0, None).await.unwrap(), 3);
    }

    /// **Scenario**: Star routing — hub jumps to off-spine worker and back until done.
    #[tokio::test]
    async fn invoke_star_routing() {
        let mut g = StateGraph::<i32>::new();
        g.add_node("hub", Arc::new(HubNode));
        g.add_node("worker", Arc::new(BackNode));
        g.add_edge(START, "hub");
        g.add_edge("hub", END);
        let graph = g.compile().unwrap();
        // 0 → worker(5) → hub → worker(10) → hub ends.
        assert_eq!(graph.invoke(0, None).await.unwrap(), 10);
    }

    /// **Scenario**: Jump to an unregistered node fails the run.
    #[tokio::test]
    async fn invoke_jump_to_unknown_node_fails() {
        #[derive(Clone)]
        struct BadJump;
        #[async_trait]
        impl Node<i32> for BadJump {
            fn id(&self) -> &str {
                "bad"
            }
            async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
                Ok((state, Next::Node("nowhere".into())))
            }
        }
        let mut g = StateGraph::<i32>::new();
        g.add_node("bad", Arc::new(BadJump));
        g.add_edge(START, "bad");
        g.add_edge("bad", END);
        let graph = g.compile().unwrap();
        match graph.invoke(0, None).await {
            Err(AgentError::ExecutionFailed(msg)) => assert!(msg.contains("nowhere"), "{}", msg),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    /// **Scenario**: With checkpointer + thread_id, a run writes Input + one Loop per step,
    /// newest first in list.
    #[tokio::test]
    async fn invoke_checkpoints_every_step() {
        let saver = Arc::new(MemorySaver::<i32>::new());
        let mut g = StateGraph::<i32>::new();
        g.add_node("first", Arc::new(AddNode { id: "first", delta: 1 }));
        g.add_node("second", Arc::new(AddNode { id: "second", delta: 2 }));
        g.add_edge(START, "first");
        g.add_edge("first", "second");
        g.add_edge("second", END);
        let graph = g.compile_with_checkpointer(saver.clone()).unwrap();

        let config = RunnableConfig::for_thread("t1");
        graph.invoke(0, Some(config.clone())).await.unwrap();

        let items = saver.list(&config).await.unwrap();
        // Input(step 0) + Loop after first (1) + Loop after second (2).
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].metadata.step, 2);
        assert_eq!(items[2].metadata.step, 0);
        assert_eq!(items[2].metadata.source, CheckpointSource::Input);
        assert_eq!(items[0].metadata.source, CheckpointSource::Loop);
    }

    /// **Scenario**: A second run on the same thread continues step numbering.
    #[tokio::test]
    async fn step_numbering_continues_across_runs() {
        let saver = Arc::new(MemorySaver::<i32>::new());
        let mut g = StateGraph::<i32>::new();
        g.add_node("first", Arc::new(AddNode { id: "first", delta: 1 }));
        g.add_edge(START, "first");
        g.add_edge("first", END);
        let graph = g.compile_with_checkpointer(saver.clone()).unwrap();

        let config = RunnableConfig::for_thread("t1");
        graph.invoke(0, Some(config.clone())).await.unwrap();
        graph.invoke(1, Some(config.clone())).await.unwrap();

        let items = saver.list(&config).await.unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].metadata.step, 3);
    }

    /// **Scenario**: Without thread_id, no checkpoints are written.
    #[tokio::test]
    async fn no_thread_id_no_checkpoints() {
        let saver = Arc::new(MemorySaver::<i32>::new());
        let mut g = StateGraph::<i32>::new();
        g.add_node("first", Arc::new(AddNode { id: "first", delta: 1 }));
        g.add_edge(START, "first");
        g.add_edge("first", END);
        let graph = g.compile_with_checkpointer(saver.clone()).unwrap();

        graph.invoke(0, Some(RunnableConfig::default())).await.unwrap();
        let items = saver.list(&RunnableConfig::for_thread("t1")).await.unwrap();
        assert!(items.is_empty());
    }

    /// **Scenario**: stream with Values + Updates emits both event kinds per node.
    #[tokio::test]
    async fn stream_emits_values_and_updates() {
        let graph = linear_graph();
        let mut stream = graph.stream(0, None, [StreamMode::Values, StreamMode::Updates]);
        let mut values = Vec::new();
        let mut updates = Vec::new();
        while let Some(event) = stream.next().await {
            match event {
                StreamEvent::Values(v) => values.push(v),
                StreamEvent::Updates { node_id, state } => updates.push((node_id, state)),
                _ => {}
            }
        }
        assert_eq!(values, vec![1, 3]);
        assert_eq!(
            updates,
            vec![("first".to_string(), 1), ("second".to_string(), 3)]
        );
    }
}
