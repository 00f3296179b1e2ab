//! Supervisor: the hub node that routes between worker agents.
//!
//! The supervisor holds the conversation. Each turn it either answers the
//! user directly (ending the run) or calls a synthetic `transfer_to_<agent>`
//! tool, which jumps execution to that agent's node. Workers always jump
//! back, so the graph is a star with the supervisor at the center.

mod builder;
mod node;

pub use builder::GraphBuilder;
pub use node::SupervisorNode;

use crate::llm::ToolSpec;

/// Node id of the supervisor; workers jump back to it by this id.
pub const SUPERVISOR_NODE: &str = "supervisor";

/// Prefix of the synthetic routing tools exposed to the supervisor model.
pub const TRANSFER_PREFIX: &str = "transfer_to_";

/// Builds the supervisor system prompt for a set of (name, summary) agents.
pub(crate) fn supervisor_prompt(agents: &[(String, String)]) -> String {
    let mut prompt = String::from(
        "You are a supervisor coordinating a team of agents. Read the conversation and \
         decide the next step. To delegate, call the matching transfer tool; the agent \
         will report back to you. When you have everything you need, answer the user \
         directly in plain text and do not call any tool.\n\nYour agents:\n",
    );
    for (name, summary) in agents {
        prompt.push_str(&format!("- {}: {}\n", name, summary));
    }
    prompt.push_str(
        "\nDelegate one agent at a time. Do not invent agents. Do not answer on an \
         agent's behalf before it has reported.",
    );
    prompt
}

/// One `transfer_to_<name>` spec per agent, in registry order. Attach these
/// to the supervisor's LLM client when using a real provider.
pub fn transfer_specs(agents: &[(String, String)]) -> Vec<ToolSpec> {
    agents
        .iter()
        .map(|(name, summary)| ToolSpec {
            name: format!("{}{}", TRANSFER_PREFIX, name),
            description: format!("Hand the conversation to the {} agent. {}", name, summary),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: The prompt lists every agent; specs carry the transfer prefix.
    #[test]
    fn prompt_and_specs_cover_all_agents() {
        let agents = vec![
            ("search".to_string(), "Searches the web.".to_string()),
            ("recall".to_string(), "Recalls past talk.".to_string()),
        ];
        let prompt = supervisor_prompt(&agents);
        assert!(prompt.contains("- search: Searches the web."));
        assert!(prompt.contains("- recall: Recalls past talk."));

        let specs = transfer_specs(&agents);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "transfer_to_search");
        assert_eq!(specs[1].name, "transfer_to_recall");
    }
}
