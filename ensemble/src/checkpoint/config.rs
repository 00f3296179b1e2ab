//! Invoke config: thread_id, checkpoint_id, checkpoint_ns, user_id.
//!
//! Passed to `CompiledStateGraph::invoke` / `stream` and to the Checkpointer.
//! thread_id identifies the conversation; checkpoint_id selects a snapshot
//! for time travel / branching.

/// Config for a single invoke. Identifies the thread and optional checkpoint.
///
/// When using a checkpointer, invoke must provide at least thread_id.
///
/// **Interaction**: Passed to `CompiledStateGraph::invoke(state, config)` and
/// `Checkpointer::put` / `get_tuple` / `list`.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Unique id for this conversation/thread. Required when using a checkpointer.
    pub thread_id: Option<String>,
    /// If set, load state from this checkpoint instead of the latest (time travel / branch).
    pub checkpoint_id: Option<String>,
    /// Optional namespace for checkpoints (e.g. subgraph). Default is empty.
    pub checkpoint_ns: String,
    /// Optional user id; used by the recall service for per-user namespacing.
    pub user_id: Option<String>,
}

impl RunnableConfig {
    /// Config with only a thread id; the common case.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Self::default()
        }
    }

    /// Same config pointed at a specific checkpoint.
    pub fn at_checkpoint(&self, checkpoint_id: impl Into<String>) -> Self {
        Self {
            checkpoint_id: Some(checkpoint_id.into()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: RunnableConfig::default() has all optionals None and checkpoint_ns empty.
    #[test]
    fn runnable_config_default_all_optionals_none_or_empty() {
        let c = RunnableConfig::default();
        assert!(c.thread_id.is_none());
        assert!(c.checkpoint_id.is_none());
        assert!(c.checkpoint_ns.is_empty());
        assert!(c.user_id.is_none());
    }

    /// **Scenario**: at_checkpoint keeps the thread and sets only checkpoint_id.
    #[test]
    fn at_checkpoint_preserves_thread() {
        let c = RunnableConfig::for_thread("t1").at_checkpoint("cp9");
        assert_eq!(c.thread_id.as_deref(), Some("t1"));
        assert_eq!(c.checkpoint_id.as_deref(), Some("cp9"));
    }
}
