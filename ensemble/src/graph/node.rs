//! Node trait: one step of a state graph.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::next::Next;
use crate::graph::run_context::RunContext;

/// One node in a state graph: receives state, returns updated state plus a
/// routing decision.
///
/// `run_with_context` is the streaming-aware variant; the default forwards to
/// `run`, so nodes that do not stream implement only `run`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    /// Stable node id; must match the id used in `StateGraph::add_node`.
    fn id(&self) -> &str;

    /// One step: state in, state out, plus where to go next.
    async fn run(&self, state: S) -> Result<(S, Next), AgentError>;

    /// Streaming-aware step; default ignores the context.
    async fn run_with_context(
        &self,
        state: S,
        _ctx: &RunContext<S>,
    ) -> Result<(S, Next), AgentError> {
        self.run(state).await
    }
}
