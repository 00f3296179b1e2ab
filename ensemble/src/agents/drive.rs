//! Drive agent over the Drive tool.

use std::sync::Arc;

use crate::agents::{Agent, WorkerNode};
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::state::SupervisorState;
use crate::tools::Tool;

const INSTRUCTIONS: &str = "You are a file agent. Use the gdrive tool to work with the \
user's Drive files. Tool operations:\n\
list_files:<max_results>\n\
load_metadata:<file_id>\n\
load_content:<file_id>\n\
update_sharing:<file_id>,<email>,<role>\n\
Roles are reader, commenter, or writer. Confirm what you did in your answer.";

/// Agent wrapping the Drive tool.
pub struct DriveAgent {
    tool: Arc<dyn Tool>,
}

impl DriveAgent {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool }
    }
}

impl Agent for DriveAgent {
    fn name(&self) -> &str {
        "drive"
    }

    fn instructions(&self) -> &str {
        INSTRUCTIONS
    }

    fn summary(&self) -> &str {
        "Lists, reads, and shares Drive files."
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
