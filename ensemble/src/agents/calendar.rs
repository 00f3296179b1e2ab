//! Calendar agent over the Calendar tool.

use std::sync::Arc;

use crate::agents::{Agent, WorkerNode};
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::state::SupervisorState;
use crate::tools::Tool;

const INSTRUCTIONS: &str = "You are a calendar agent. Use the calendar tool to list, \
create, and update events on the user's primary calendar. Tool operations:\n\
list_events:<max_results>\n\
create_event:<summary>,<start_time>,<end_time>\n\
update_event:<event_id>,<summary>,<start_time>,<end_time>\n\
Times are RFC3339. Confirm what you did in your answer.";

/// Agent wrapping the Calendar tool.
pub struct CalendarAgent {
    tool: Arc<dyn Tool>,
}

impl CalendarAgent {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool }
    }
}

impl Agent for CalendarAgent {
    fn name(&self) -> &str {
        "calendar"
    }

    fn instructions(&self) -> &str {
        INSTRUCTIONS
    }

    fn summary(&self) -> &str {
        "Lists, creates, and updates calendar events."
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
