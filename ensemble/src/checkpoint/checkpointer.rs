//! Checkpointer trait and errors.
//!
//! A Checkpointer persists per-thread state snapshots so runs can resume,
//! replay, and branch. Implementations: `MemorySaver` (dev/tests),
//! `SqliteSaver` (feature `sqlite`).

use async_trait::async_trait;
use thiserror::Error;

use crate::checkpoint::checkpoint::{Checkpoint, CheckpointListItem};
use crate::checkpoint::config::RunnableConfig;

/// Checkpointer failure.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Config did not carry a thread_id; nothing to key the checkpoint by.
    #[error("config.thread_id is required for checkpointing")]
    MissingThreadId,
    /// State (de)serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// Backing storage failed (e.g. SQLite error).
    #[error("storage failed: {0}")]
    Storage(String),
}

/// Persists and loads checkpoints keyed by (thread_id, checkpoint_ns, checkpoint_id).
///
/// **Interaction**: `CompiledStateGraph` calls `put` after every step and
/// `get_tuple` before a run when config carries a thread_id;
/// `WorkflowHistory` uses `list` + `get_tuple` for time travel.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Stores one checkpoint under the config's thread and namespace.
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<(), CheckpointError>;

    /// Loads the checkpoint selected by config: by `checkpoint_id` when set,
    /// otherwise the latest for the thread. None when the thread has no history.
    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<Checkpoint<S>>, CheckpointError>;

    /// Lists checkpoints for the thread, newest first.
    async fn list(
        &self,
        config: &RunnableConfig,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;
}
