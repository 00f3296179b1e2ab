//! # Ensemble
//!
//! A multi-agent orchestration backend in Rust. One supervisor LLM holds the
//! conversation and delegates to worker agents (web search, mail, calendar,
//! files, semantic recall) over a **state-in, state-out** graph: a single
//! [`SupervisorState`] flows through every node.
//!
//! ## Design Principles
//!
//! - **Star topology**: Only the supervisor sits on the START→END spine.
//!   Workers are off-spine nodes reached via `transfer_to_<agent>` tool calls
//!   and always hand the turn back.
//! - **Checkpoint everything**: With a checkpointer and a `thread_id`, every
//!   node step is snapshotted, so conversations resume, replay, and branch
//!   from any point.
//! - **Uniform tools**: Every vendor wrapper takes one `operation:args`
//!   string and returns plain text; parsing is pure and unit-tested.
//!
//! ## Main Modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, `Next` — build and
//!   run state graphs.
//! - [`supervisor`]: `SupervisorNode` and `GraphBuilder` — the routing hub and
//!   the star wiring.
//! - [`agents`]: `Agent` trait, `AgentRegistry`, `WorkerNode`, and the
//!   concrete worker agents.
//! - [`history`]: `WorkflowHistory` — list, resume, and branch conversations.
//! - [`checkpoint`]: Checkpointing with in-memory and SQLite savers.
//! - [`recall`]: Embeddings, vector indexes, and the k-NN memory service.
//! - [`tools`]: Uniform `Tool` trait and the Google API wrappers.
//! - [`llm`]: `LlmClient` trait, `MockLlm`, and OpenAI clients via features.
//!
//! ## Features
//!
//! - `sqlite` (default): Persistent checkpointer.
//! - `google` (default): Gmail, Calendar, Drive, and web search tools.
//! - `elastic` (default): Elasticsearch-backed vector index.
//! - `openai`: Chat and embedding clients via `async-openai`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ensemble::agents::RecallAgent;
//! use ensemble::checkpoint::{MemorySaver, RunnableConfig};
//! use ensemble::history::WorkflowHistory;
//! use ensemble::llm::MockLlm;
//! use ensemble::recall::{HashEmbedder, InMemoryIndex, MemoryService};
//! use ensemble::supervisor::GraphBuilder;
//! use ensemble::stream::StreamMode;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let memory = MemoryService::new(
//!     Arc::new(HashEmbedder::default()),
//!     Arc::new(InMemoryIndex::new()),
//! );
//! let graph = GraphBuilder::new(Arc::new(MockLlm::new()))
//!     .register(Arc::new(RecallAgent::new(memory)))
//!     .unwrap()
//!     .with_checkpointer(Arc::new(MemorySaver::new()))
//!     .build()
//!     .unwrap();
//!
//! let history = WorkflowHistory::new(graph).unwrap();
//! let config = RunnableConfig::for_thread("thread-1");
//! let _stream = history
//!     .chat(&config, "what did we decide last week?", [StreamMode::Values])
//!     .await
//!     .unwrap();
//! # }
//! ```

pub mod agents;
pub mod checkpoint;
pub mod error;
pub mod graph;
pub mod history;
pub mod llm;
pub mod message;
pub mod recall;
pub mod state;
pub mod stream;
pub mod supervisor;
pub mod tools;

pub use agents::{Agent, AgentRegistry, RecallAgent, RecallTool, RegistryError, WorkerNode};
#[cfg(feature = "google")]
pub use agents::{CalendarAgent, DriveAgent, MailAgent, SearchAgent};
pub use checkpoint::{
    Checkpoint, CheckpointError, CheckpointListItem, CheckpointMetadata, CheckpointSource,
    Checkpointer, JsonSerializer, MemorySaver, RunnableConfig,
};
#[cfg(feature = "sqlite")]
pub use checkpoint::SqliteSaver;
pub use error::AgentError;
pub use graph::{CompilationError, CompiledStateGraph, Next, Node, StateGraph, END, START};
pub use history::{HistoryError, StateSnapshot, WorkflowHistory};
pub use llm::{LlmClient, LlmResponse, MockLlm, ToolChoiceMode, ToolSpec};
#[cfg(feature = "openai")]
pub use llm::{ChatOpenAI, OpenAIEmbedder};
pub use message::Message;
pub use recall::{
    Document, Embedder, HashEmbedder, InMemoryIndex, KnnHit, KnnResponse, MemoryService,
    RecallError, VectorIndex, DEFAULT_DIMS,
};
#[cfg(feature = "elastic")]
pub use recall::ElasticIndex;
pub use state::{SupervisorState, ToolCall, ToolResult};
pub use stream::{MessageChunk, StreamEvent, StreamMetadata, StreamMode};
pub use supervisor::{GraphBuilder, SupervisorNode, SUPERVISOR_NODE, TRANSFER_PREFIX};
pub use tools::{Tool, ToolError};
#[cfg(feature = "google")]
pub use tools::{BearerToken, CalendarTool, DriveTool, GmailTool, GoogleSearchTool};
