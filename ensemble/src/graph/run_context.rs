//! Per-run context handed to nodes during streaming runs.

use std::collections::HashSet;
use std::fmt::Debug;

use tokio::sync::mpsc;

use crate::checkpoint::RunnableConfig;
use crate::stream::{StreamEvent, StreamMode};

/// Context for one graph run: invoke config plus the stream channel.
///
/// **Interaction**: Built by `CompiledStateGraph::stream`; nodes that support
/// streaming (e.g. the supervisor's LLM turn) read `stream_mode` and send
/// `StreamEvent::Messages` chunks through `stream_tx`.
#[derive(Clone)]
pub struct RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Config for this run (thread_id, checkpoint_id, ...).
    pub config: RunnableConfig,
    /// Channel for stream events; None during plain invoke.
    pub stream_tx: Option<mpsc::Sender<StreamEvent<S>>>,
    /// Which event kinds the consumer asked for.
    pub stream_mode: HashSet<StreamMode>,
}
