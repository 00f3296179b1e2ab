//! State graph: nodes + explicit edges, compile and run.
//!
//! Add nodes and edges, compile (optionally with a checkpointer), then invoke
//! or stream with state. The supervisor graph is a star: only the supervisor
//! sits on the START→END spine; workers are reached via `Next::Node` jumps.

mod compile_error;
mod compiled;
mod next;
mod node;
mod run_context;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use next::Next;
pub use node::Node;
pub use run_context::RunContext;
pub use state_graph::{StateGraph, END, START};
