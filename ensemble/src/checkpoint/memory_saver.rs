//! In-memory checkpointer for dev and tests.
//!
//! Keeps every checkpoint per (thread_id, checkpoint_ns) in insertion order.
//! Nothing survives process exit; use `SqliteSaver` for persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::checkpoint::checkpoint::{Checkpoint, CheckpointListItem};
use crate::checkpoint::checkpointer::{CheckpointError, Checkpointer};
use crate::checkpoint::config::RunnableConfig;

/// In-memory Checkpointer. Thread-safe via an internal mutex.
///
/// **Interaction**: Compiled into graphs with
/// `StateGraph::compile_with_checkpointer(Arc::new(MemorySaver::new()))`.
pub struct MemorySaver<S> {
    threads: Mutex<HashMap<(String, String), Vec<Checkpoint<S>>>>,
}

impl<S> MemorySaver<S> {
    pub fn new() -> Self {
        Self {
            threads: Mutex::new(HashMap::new()),
        }
    }

    fn key(config: &RunnableConfig) -> Result<(String, String), CheckpointError> {
        let thread_id = config
            .thread_id
            .clone()
            .ok_or(CheckpointError::MissingThreadId)?;
        Ok((thread_id, config.checkpoint_ns.clone()))
    }
}

impl<S> Default for MemorySaver<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<(), CheckpointError> {
        let key = Self::key(config)?;
        let mut threads = self
            .threads
            .lock()
            .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        threads.entry(key).or_default().push(checkpoint.clone());
        Ok(())
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let key = Self::key(config)?;
        let threads = self
            .threads
            .lock()
            .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        let Some(checkpoints) = threads.get(&key) else {
            return Ok(None);
        };
        match &config.checkpoint_id {
            Some(id) => Ok(checkpoints.iter().find(|cp| &cp.id == id).cloned()),
            None => Ok(checkpoints.last().cloned()),
        }
    }

    async fn list(
        &self,
        config: &RunnableConfig,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let key = Self::key(config)?;
        let threads = self
            .threads
            .lock()
            .map_err(|e| CheckpointError::Storage(e.to_string()))?;
        let Some(checkpoints) = threads.get(&key) else {
            return Ok(Vec::new());
        };
        // Newest first, matching persistent savers.
        Ok(checkpoints
            .iter()
            .rev()
            .map(|cp| CheckpointListItem {
                checkpoint_id: cp.id.clone(),
                metadata: cp.metadata.clone(),
            })
            .collect())
    }
}
