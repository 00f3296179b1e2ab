//! Checkpoint and metadata types.
//!
//! A checkpoint is one snapshot of graph state, keyed by
//! (thread_id, checkpoint_ns, checkpoint_id). History, branching, and replay
//! are all lookups over these.

use std::collections::HashMap;
use std::time::SystemTime;

/// Metadata for a single checkpoint (source, step, created_at).
///
/// Used by Checkpointer implementations and by list() for the history view.
#[derive(Debug, Clone)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    pub step: u64,
    pub created_at: Option<SystemTime>,
}

/// Source of the checkpoint: what wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSource {
    /// Initial state at the start of a run, before the first node.
    Input,
    /// Written after a node step inside a run.
    Loop,
    /// Written by an explicit state update.
    Update,
    /// Marks the branch point of a replay.
    Fork,
}

impl CheckpointSource {
    /// Stable string form, used by persistent savers and JSON views.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointSource::Input => "input",
            CheckpointSource::Loop => "loop",
            CheckpointSource::Update => "update",
            CheckpointSource::Fork => "fork",
        }
    }

    /// Parse the stable string form; unknown strings map to Loop.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "input" => CheckpointSource::Input,
            "update" => CheckpointSource::Update,
            "fork" => CheckpointSource::Fork,
            _ => CheckpointSource::Loop,
        }
    }
}

/// One checkpoint: state snapshot + channel versions + id/ts.
///
/// channel_values is the graph state S; channel_versions is kept for
/// compatibility with merge/reducer schemes and is empty in this system.
///
/// **Interaction**: Produced by graph execution; consumed by
/// `Checkpointer::put`, returned by `get_tuple`.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    pub id: String,
    pub ts: String,
    pub channel_values: S,
    pub channel_versions: HashMap<String, u64>,
    pub metadata: CheckpointMetadata,
}

/// Item returned by Checkpointer::list for history / time-travel.
#[derive(Debug, Clone)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    /// Creates a checkpoint from current state. Uses current time for id/ts;
    /// the step keeps ids unique within a run.
    pub fn from_state(state: S, source: CheckpointSource, step: u64) -> Self {
        let now = SystemTime::now();
        let ts = format!(
            "{}",
            now.duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0)
        );
        let id = format!("{}-{}", ts, step);
        Self {
            id,
            ts,
            channel_values: state,
            channel_versions: HashMap::new(),
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }
}
