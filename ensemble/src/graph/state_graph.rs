//! State graph builder: nodes + explicit edges (from → to).
//!
//! Add nodes with `add_node`, define the spine with `add_edge(from, to)` using
//! `START` and `END` for graph entry/exit, then `compile` or
//! `compile_with_checkpointer` to get a `CompiledStateGraph`.
//!
//! Unlike a strictly linear chain, nodes may exist off the spine: the
//! supervisor graph is a star, with worker nodes reached only through
//! `Next::Node(id)` jumps. Compilation validates the spine, not reachability.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::checkpoint::Checkpointer;
use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::node::Node;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// State graph under construction: nodes plus explicit edges.
///
/// Generic over state type `S`. Build with `add_node` / `add_edge(from, to)`
/// (use `START` and `END` for entry/exit), then `compile()` to obtain an
/// executable graph.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S>
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Edges (from_id, to_id). The compiled graph derives the Continue spine from these.
    edges: Vec<(String, String)>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Adds a node; id must be unique. Replaces if same id.
    ///
    /// Returns `&mut Self` for method chaining. Nodes without any edge are
    /// valid jump targets for `Next::Node(id)`.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an edge from `from_id` to `to_id`.
    ///
    /// Use `START` for graph entry and `END` for graph exit. All non-sentinel
    /// endpoints must be registered via `add_node` before `compile()`.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with a checkpointer.
    ///
    /// When `invoke(state, config)` / `stream(...)` is called with
    /// `config.thread_id`, an Input checkpoint is written before the first
    /// node and a Loop checkpoint after every node step.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }

        let mut start_edges = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t.clone());
        let first = match (start_edges.next(), start_edges.next()) {
            (Some(first), None) => first,
            _ => return Err(CompilationError::MissingStart),
        };

        // Walk the spine from START; it must reach END without revisiting a node.
        let next_map: HashMap<&String, &String> = self
            .edges
            .iter()
            .filter(|(f, _)| f != START)
            .map(|(f, t)| (f, t))
            .collect();

        let mut edge_order = vec![first.clone()];
        let mut visited: HashSet<String> = HashSet::from([first.clone()]);
        let mut current = first;
        loop {
            match next_map.get(&current) {
                Some(to) if to.as_str() == END => break,
                Some(to) => {
                    if !visited.insert((*to).clone()) {
                        return Err(CompilationError::InvalidChain(format!(
                            "cycle through {}",
                            to
                        )));
                    }
                    edge_order.push((*to).clone());
                    current = (*to).clone();
                }
                None => {
                    return Err(CompilationError::InvalidChain(format!(
                        "spine dead-ends at {} (no edge to END)",
                        current
                    )));
                }
            }
        }

        Ok(CompiledStateGraph::new(self.nodes, edge_order, checkpointer))
    }
}
