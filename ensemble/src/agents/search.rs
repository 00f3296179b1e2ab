//! Web search agent.

use std::sync::Arc;

use crate::agents::{Agent, WorkerNode};
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::state::SupervisorState;
use crate::tools::Tool;

const INSTRUCTIONS: &str = "You are a web research agent. Use the gsearch tool to find \
current information on the web. The tool input is the search query. Read the results and \
answer with the facts you found, citing the source links.";

/// Agent wrapping the web search tool.
pub struct SearchAgent {
    tool: Arc<dyn Tool>,
}

impl SearchAgent {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool }
    }
}

impl Agent for SearchAgent {
    fn name(&self) -> &str {
        "search"
    }

    fn instructions(&self) -> &str {
        INSTRUCTIONS
    }

    fn summary(&self) -> &str {
        "Searches the web for current information."
    }

    fn build(&self, llm: Arc<dyn LlmClient>) -> Arc<dyn Node<SupervisorState>> {
        Arc::new(WorkerNode::new(
            self.name(),
            self.instructions(),
            self.tool.clone(),
            llm,
        ))
    }
}
