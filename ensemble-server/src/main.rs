//! HTTP server for the supervisor workflow and the semantic memory service.
//!
//! Routes:
//! - `POST /chat` — continue a thread with a new prompt, SSE stream of node updates.
//! - `GET /workflow/history` — checkpoint history for a thread, newest first.
//! - `POST /workflow/update` — branch from a checkpoint with an edited prompt, SSE stream.
//! - `POST /memory/conversation` — index conversation chunks into memory.
//! - `GET /memory/knn` — k nearest remembered passages for a query.
//!
//! Configure via env: OPENAI_API_KEY, OPENAI_MODEL, EMBED_MODEL, DB_PATH,
//! ELASTIC_URL, GOOGLE_TOKEN_FILE, GOOGLE_API_KEY, GOOGLE_CSE_ID, LISTEN.
//! Load .env with dotenv.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span};

use ensemble::agents::{CalendarAgent, DriveAgent, MailAgent, RecallAgent, SearchAgent};
use ensemble::checkpoint::{JsonSerializer, RunnableConfig, SqliteSaver};
use ensemble::history::{HistoryError, WorkflowHistory};
use ensemble::recall::{
    ElasticIndex, Embedder, InMemoryIndex, MemoryService, VectorIndex, DEFAULT_DIMS,
};
use ensemble::stream::{StreamEvent, StreamMode};
use ensemble::supervisor::{transfer_specs, GraphBuilder};
use ensemble::tools::{BearerToken, CalendarTool, DriveTool, GmailTool, GoogleSearchTool};
use ensemble::{ChatOpenAI, OpenAIEmbedder, SupervisorState};

/// Shared state for all routes.
struct AppState {
    history: WorkflowHistory,
    memory: MemoryService,
}

/// Load .env from current directory; if not found, try parent (workspace root
/// when run from crate dir).
fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        return;
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(parent) = cwd.parent() {
            let env_path = parent.join(".env");
            if env_path.is_file() {
                let _ = dotenv::from_path(env_path);
            }
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,ensemble_server=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds the memory service: OpenAI embeddings, Elasticsearch index when
/// ELASTIC_URL is set, in-memory index otherwise.
async fn build_memory() -> Result<MemoryService, Box<dyn std::error::Error + Send + Sync>> {
    let embed_model =
        std::env::var("EMBED_MODEL").unwrap_or_else(|_| "text-embedding-3-small".to_string());
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(embed_model, DEFAULT_DIMS));

    let index: Arc<dyn VectorIndex> = match std::env::var("ELASTIC_URL") {
        Ok(url) => {
            let index_name =
                std::env::var("ELASTIC_INDEX").unwrap_or_else(|_| "conversations".to_string());
            let elastic = ElasticIndex::new(url, index_name, embedder.dims());
            elastic.ensure_index().await?;
            Arc::new(elastic)
        }
        Err(_) => Arc::new(InMemoryIndex::new()),
    };
    Ok(MemoryService::new(embedder, index))
}

/// Builds the supervisor workflow: registers every agent whose credentials
/// are present, wires the SQLite checkpointer, and attaches the transfer
/// tool specs to the supervisor's client.
fn build_history(
    memory: MemoryService,
    model: &str,
) -> Result<WorkflowHistory, Box<dyn std::error::Error + Send + Sync>> {
    let worker_llm = Arc::new(ChatOpenAI::new(model));
    let mut builder = GraphBuilder::new(worker_llm)
        .register(Arc::new(RecallAgent::new(memory)))
        .map_err(|e| e.to_string())?;

    if let (Ok(_), Ok(_)) = (
        std::env::var("GOOGLE_API_KEY"),
        std::env::var("GOOGLE_CSE_ID"),
    ) {
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
    info!(agents = ?catalog.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(), "agents registered");
    let supervisor_llm =
        Arc::new(ChatOpenAI::new(model).with_tools(transfer_specs(&catalog)));
    builder = builder.with_supervisor_llm(supervisor_llm);

    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "checkpoints.db".to_string());
    let saver = SqliteSaver::open(&db_path, Arc::new(JsonSerializer))?;
    info!(db_path = %db_path, "checkpointer ready");

    let graph = builder.with_checkpointer(Arc::new(saver)).build()?;
    Ok(WorkflowHistory::new(graph)?)
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/workflow/history", get(workflow_history))
        .route("/workflow/update", post(workflow_update))
        .route("/memory/conversation", post(memory_conversation))
        .route("/memory/knn", get(memory_knn))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<Body>| {
                info_span!("request", method = %req.method(), uri = %req.uri())
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    load_dotenv();
    init_tracing();

    if std::env::var("OPENAI_API_KEY").unwrap_or_default().is_empty() {
        return Err("OPENAI_API_KEY must be set".into());
    }
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    info!(model = %model, "LLM config loaded");

    let memory = build_memory().await?;
    let history = build_history(memory.clone(), &model)?;
    let app = build_router(Arc::new(AppState { history, memory }));

    let listen = std::env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:8123".to_string());
    info!("listening on http://{}", listen);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Deserialize)]
struct ChatRequest {
    thread_id: String,
    prompt: String,
}

#[derive(Deserialize)]
struct UpdateRequest {
    thread_id: String,
    checkpoint_id: String,
    prompt: String,
}

#[derive(Deserialize)]
struct HistoryQuery {
    thread_id: String,
}

#[derive(Serialize)]
struct SnapshotView {
    checkpoint_id: String,
    source: String,
    step: u64,
}

#[derive(Deserialize)]
struct ConversationRequest {
    conversation: Vec<String>,
}

#[derive(Deserialize)]
struct KnnQuery {
    query: String,
    #[serde(default = "default_k")]
    k: usize,
}

fn default_k() -> usize {
    4
}

/// One SSE data line per node update.
#[derive(Serialize)]
struct UpdateChunk<'a> {
    node: &'a str,
    role: &'a str,
    content: &'a str,
}

/// Wraps a graph update stream as an SSE response; ends with `data: [DONE]`.
fn sse_response(stream: ReceiverStream<StreamEvent<SupervisorState>>) -> Response {
    let lines = stream
        .filter_map(|event| match event {
            StreamEvent::Updates { node_id, state } => {
                let (role, content) = state
                    .messages
                    .last()
                    .map(|m| (m.role(), m.content().to_string()))
                    .unwrap_or(("assistant", String::new()));
                let chunk = UpdateChunk {
                    node: &node_id,
                    role,
                    content: &content,
                };
                serde_json::to_string(&chunk)
                    .ok()
                    .map(|json| format!("data: {}\n\n", json))
            }
            _ => None,
        })
        .chain(tokio_stream::once("data: [DONE]\n\n".to_string()))
        .map(Ok::<_, std::io::Error>);

    let mut res = StatusCode::OK.into_response();
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    res.headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    *res.body_mut() = Body::from_stream(lines);
    res
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ServerError> {
    let config = RunnableConfig::for_thread(&req.thread_id);
    let stream = state
        .history
        .chat(&config, &req.prompt, [StreamMode::Updates])
        .await?;
    Ok(sse_response(stream))
}

async fn workflow_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<SnapshotView>>, ServerError> {
    let config = RunnableConfig::for_thread(&query.thread_id);
    let snapshots = state.history.state_history(&config).await?;
    Ok(Json(
        snapshots
            .into_iter()
            .map(|s| SnapshotView {
                checkpoint_id: s.checkpoint_id,
                source: s.source.as_str().to_string(),
                step: s.step,
            })
            .collect(),
    ))
}

async fn workflow_update(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateRequest>,
) -> Result<Response, ServerError> {
    let config = RunnableConfig::for_thread(&req.thread_id);
    let stream = state
        .history
        .update(&config, &req.checkpoint_id, &req.prompt, [StreamMode::Updates])
        .await?;
    Ok(sse_response(stream))
}

async fn memory_conversation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConversationRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .memory
        .remember_conversation(&req.conversation)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn memory_knn(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KnnQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let response = state
        .memory
        .knn(&query.query, query.k)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(Json(response))
}

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<HistoryError> for ServerError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::UnknownCheckpoint(id) => {
                ServerError::NotFound(format!("unknown checkpoint: {}", id))
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(status = %status, "{}", self);
        (
            status,
            Json(serde_json::json!({ "error": { "message": self.to_string() } })),
        )
            .into_response()
    }
}
