//! Mail agent over the Gmail tool.

use std::sync::Arc;

use crate::agents::{Agent, WorkerNode};
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::state::SupervisorState;
use crate::tools::Tool;

const INSTRUCTIONS: &str = "You are an email agent. Use the gmail tool to search messages, \
create drafts, and send mail. Tool operations:\n\
search_messages:<query>\n\
create_draft:<sender>,<to>,<subject>,<body>\n\
send_message:<sender>,<to>,<subject>,<body>\n\
Fields are comma separated; commas in the body stay in the body. Confirm what you did \
in your answer.";

/// Agent wrapping the Gmail tool.
pub struct MailAgent {
    tool: Arc<dyn Tool>,
}

impl MailAgent {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool }
    }
}

impl Agent for MailAgent {
    fn name(&self) -> &str {
        "mail"
    }

    fn instructions(&self) -> &str {
        INSTRUCTIONS
    }

    fn summary(&self) -> &str {
        "Searches, drafts, and sends email."
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
