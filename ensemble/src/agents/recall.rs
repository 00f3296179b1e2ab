//! Recall agent: answers from semantic memory instead of the outside world.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::{Agent, WorkerNode};
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::recall::MemoryService;
use crate::state::SupervisorState;
use crate::tools::{Tool, ToolError};

const DEFAULT_K: usize = 4;

const INSTRUCTIONS: &str = "You are a memory recall agent. You look up what the user and \
assistant have discussed before. Use the recall tool with the topic you want to look up; \
it returns the most relevant remembered passages, best match first. Answer strictly from \
what recall returns and say so when memory has nothing relevant.";

/// Tool view over [`MemoryService::knn`]. Input is the lookup query.
pub struct RecallTool {
    service: MemoryService,
    k: usize,
}

impl RecallTool {
    pub fn new(service: MemoryService) -> Self {
        Self {
            service,
            k: DEFAULT_K,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k.max(1);
        self
    }
}

#[async_trait]
impl Tool for RecallTool {
    fn name(&self) -> &str {
        "recall"
    }

    fn description(&self) -> &str {
        "Look up remembered conversation passages. Input is the topic or question; \
         returns the closest matches, best first."
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::BadArguments("provide a lookup query".into()));
        }
        let response = self
            .service
            .knn(query, self.k)
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        if response.hits.is_empty() {
            return Ok("No relevant memories found.".to_string());
        }
        Ok(response.to_string())
    }
}

/// Agent wrapping [`RecallTool`].
pub struct RecallAgent {
    service: MemoryService,
}

impl RecallAgent {
    pub fn new(service: MemoryService) -> Self {
        Self { service }
    }
}

impl Agent for RecallAgent {
    fn name(&self) -> &str {
        "recall"
    }

    fn instructions(&self) -> &str {
        INSTRUCTIONS
    }

    fn summary(&self) -> &str {
        "Recalls what was said in earlier conversations."
    }

    fn build(&self, llm: Arc<dyn LlmClient>) -> Arc<dyn Node<SupervisorState>> {
        Arc::new(WorkerNode::new(
            self.name(),
            self.instructions(),
            Arc::new(RecallTool::new(self.service.clone())),
            llm,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recall::{HashEmbedder, InMemoryIndex};

    fn service() -> MemoryService {
        MemoryService::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(InMemoryIndex::new()),
        )
    }

    /// **Scenario**: The tool surfaces remembered passages best first and
    /// reports when memory is empty.
    #[tokio::test]
    async fn recall_tool_returns_ranked_memories() {
        let svc = service();
        let tool = RecallTool::new(svc.clone()).with_k(2);

        let empty = tool.call("anything").await.unwrap();
        assert_eq!(empty, "No relevant memories found.");

        svc.remember_conversation(&[
            "the quarterly report is due friday".to_string(),
            "coffee machine is on the third floor".to_string(),
        ])
        .await
        .unwrap();
        let hits = tool.call("when is the report due").await.unwrap();
        assert!(hits.contains("quarterly report"));
    }

    /// **Scenario**: Blank input is rejected before touching the index.
    #[tokio::test]
    async fn blank_query_rejected() {
        let tool = RecallTool::new(service());
        assert!(matches!(
            tool.call("  ").await,
            Err(ToolError::BadArguments(_))
        ));
    }
}
