//! ensemble-cli library: build the supervisor workflow from env/flags and
//! drive it from the terminal.
//!
//! `--mock` wires a scripted-free `MockLlm` and the offline hash embedder so
//! the whole flow runs without keys or network; otherwise the OpenAI clients
//! are used and Google agents are registered when their credentials exist.

use std::sync::Arc;

use tokio_stream::StreamExt;

use ensemble::agents::{CalendarAgent, DriveAgent, MailAgent, RecallAgent, SearchAgent};
use ensemble::checkpoint::{JsonSerializer, RunnableConfig, SqliteSaver};
use ensemble::history::{HistoryError, WorkflowHistory};
use ensemble::llm::LlmClient;
use ensemble::recall::{
    Embedder, HashEmbedder, InMemoryIndex, MemoryService, DEFAULT_DIMS,
};
use ensemble::stream::{StreamEvent, StreamMode};
use ensemble::supervisor::{transfer_specs, GraphBuilder};
use ensemble::tools::{BearerToken, CalendarTool, DriveTool, GmailTool, GoogleSearchTool};
use ensemble::{ChatOpenAI, MockLlm, OpenAIEmbedder};

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Options shared by every subcommand.
pub struct CliOptions {
    /// Offline mode: mock LLM + hash embedder, no credentials needed.
    pub mock: bool,
    /// Checkpoint database path; defaults to checkpoints.db.
    pub db_path: Option<String>,
    /// Chat model for the real client.
    pub model: String,
}

fn memory_service(opts: &CliOptions) -> MemoryService {
    let embedder: Arc<dyn Embedder> = if opts.mock {
        Arc::new(HashEmbedder::default())
    } else {
        let model = std::env::var("EMBED_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());
        Arc::new(OpenAIEmbedder::new(model, DEFAULT_DIMS))
    };
    MemoryService::new(embedder, Arc::new(InMemoryIndex::new()))
}

/// Builds the workflow: SQLite checkpointer, recall agent always, Google
/// agents when their credentials are present (real mode only).
pub fn build_history(opts: &CliOptions) -> Result<WorkflowHistory, Error> {
    let worker_llm: Arc<dyn LlmClient> = if opts.mock {
        Arc::new(MockLlm::new())
    } else {
        Arc::new(ChatOpenAI::new(&opts.model))
    };

    let mut builder = GraphBuilder::new(worker_llm)
        .register(Arc::new(RecallAgent::new(memory_service(opts))))
        .map_err(|e| e.to_string())?;

    if !opts.mock {
        if std::env::var("GOOGLE_API_KEY").is_ok() && std::env::var("GOOGLE_CSE_ID").is_ok() {
            let tool = GoogleSearchTool::from_env().map_err(|e| e.to_string())?;
            builder = builder
                .register(Arc::new(SearchAgent::new(Arc::new(tool))))
                .map_err(|e| e.to_string())?;
        }
        if let Ok(path) = std::env::var("GOOGLE_TOKEN_FILE") {
            let token = BearerToken::from_file(&path).map_err(|e| e.to_string())?;
            builder = builder
                .register(Arc::new(MailAgent::new(Arc::new(GmailTool::new(
                    token.clone(),
                )))))
                .map_err(|e| e.to_string())?
                .register(Arc::new(CalendarAgent::new(Arc::new(CalendarTool::new(
                    token.clone(),
                )))))
                .map_err(|e| e.to_string())?
                .register(Arc::new(DriveAgent::new(Arc::new(DriveTool::new(token)))))
                .map_err(|e| e.to_string())?;
        }
        let catalog = builder.agent_catalog();
        let supervisor_llm =
            Arc::new(ChatOpenAI::new(&opts.model).with_tools(transfer_specs(&catalog)));
        builder = builder.with_supervisor_llm(supervisor_llm);
    }

    let db_path = opts.db_path.as_deref().unwrap_or("checkpoints.db");
    let saver = SqliteSaver::open(db_path, Arc::new(JsonSerializer))?;
    let graph = builder.with_checkpointer(Arc::new(saver)).build()?;
    Ok(WorkflowHistory::new(graph)?)
}

/// Streams one run, printing each node update; returns the final answer.
async fn stream_and_print(
    mut stream: tokio_stream::wrappers::ReceiverStream<
        StreamEvent<ensemble::SupervisorState>,
    >,
) -> Option<String> {
    let mut answer = None;
    while let Some(event) = stream.next().await {
        if let StreamEvent::Updates { node_id, state } = event {
            if let Some(message) = state.messages.last() {
                println!("[{}] {}: {}", node_id, message.role(), message.content());
            }
            if let Some(final_answer) = state.final_answer() {
                answer = Some(final_answer.to_string());
            }
        }
    }
    answer
}

/// `run`: continue the thread with a new prompt.
pub async fn cmd_run(
    history: &WorkflowHistory,
    thread_id: &str,
    prompt: &str,
) -> Result<(), Error> {
    let config = RunnableConfig::for_thread(thread_id);
    let stream = history
        .chat(&config, prompt, [StreamMode::Updates])
        .await?;
    match stream_and_print(stream).await {
        Some(answer) => {
            println!("---\n{}", answer);
            Ok(())
        }
        None => Err("run produced no answer".into()),
    }
}

/// `history`: list the thread's checkpoints, newest first.
pub async fn cmd_history(history: &WorkflowHistory, thread_id: &str) -> Result<(), Error> {
    let config = RunnableConfig::for_thread(thread_id);
    let snapshots = history.state_history(&config).await?;
    if snapshots.is_empty() {
        println!("no checkpoints for thread {}", thread_id);
        return Ok(());
    }
    println!("{:<6} {:<8} checkpoint_id", "step", "source");
    for snapshot in snapshots {
        println!(
            "{:<6} {:<8} {}",
            snapshot.step,
            snapshot.source.as_str(),
            snapshot.checkpoint_id
        );
    }
    Ok(())
}

/// `branch`: replay from a checkpoint with an edited prompt.
pub async fn cmd_branch(
    history: &WorkflowHistory,
    thread_id: &str,
    checkpoint_id: &str,
    prompt: &str,
) -> Result<(), Error> {
    let config = RunnableConfig::for_thread(thread_id);
    let stream = match history
        .update(&config, checkpoint_id, prompt, [StreamMode::Updates])
        .await
    {
        Ok(stream) => stream,
        Err(HistoryError::UnknownCheckpoint(id)) => {
            return Err(format!(
                "checkpoint {} not found on thread {} (see the history command)",
                id, thread_id
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };
    match stream_and_print(stream).await {
        Some(answer) => {
            println!("---\n{}", answer);
            Ok(())
        }
        None => Err("branch produced no answer".into()),
    }
}
