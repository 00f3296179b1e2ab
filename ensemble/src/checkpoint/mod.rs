//! # Checkpointing
//!
//! Per-thread state snapshots for time-travel, branching, and resumable
//! conversations. Checkpoints are keyed by
//! `(thread_id, checkpoint_ns, checkpoint_id)`.
//!
//! ## Config
//!
//! [`RunnableConfig`] is passed to `CompiledStateGraph::invoke` / `stream`:
//! - `thread_id`: Required when checkpointing. Identifies the conversation.
//! - `checkpoint_id`: Optional. Load a specific checkpoint (time-travel / branch).
//! - `checkpoint_ns`: Optional namespace for subgraphs.
//! - `user_id`: Used by the recall service for per-user isolation.
//!
//! ## Implementations
//!
//! | Type            | Persistence | Use case                | Feature  |
//! |-----------------|-------------|-------------------------|----------|
//! | [`MemorySaver`] | In-memory   | Dev, tests              | —        |
//! | [`SqliteSaver`] | SQLite file | Single-node, production | `sqlite` |
//!
//! [`JsonSerializer`] is required for `SqliteSaver` (state must be
//! `Serialize + DeserializeOwned`).

#[allow(clippy::module_inception)]
mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;

#[cfg(feature = "sqlite")]
mod sqlite_saver;

pub use checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::RunnableConfig;
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};

#[cfg(feature = "sqlite")]
pub use sqlite_saver::SqliteSaver;
