//! Worker agents the supervisor can delegate to.
//!
//! An [`Agent`] bundles a name, its scoped instructions, and a factory that
//! produces the graph node running it. The [`AgentRegistry`] collects agents
//! so `GraphBuilder` can wire one spoke per agent plus one synthetic
//! `transfer_to_<name>` tool on the supervisor.

mod recall;
mod worker;

#[cfg(feature = "google")]
mod calendar;
#[cfg(feature = "google")]
mod drive;
#[cfg(feature = "google")]
mod mail;
#[cfg(feature = "google")]
mod search;

pub use recall::{RecallAgent, RecallTool};
pub use worker::WorkerNode;

#[cfg(feature = "google")]
pub use calendar::CalendarAgent;
#[cfg(feature = "google")]
pub use drive::DriveAgent;
#[cfg(feature = "google")]
pub use mail::MailAgent;
#[cfg(feature = "google")]
pub use search::SearchAgent;

use std::sync::Arc;

use thiserror::Error;

use crate::graph::Node;
use crate::llm::LlmClient;
use crate::state::SupervisorState;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("agent already registered: {0}")]
    Duplicate(String),
}

/// One delegatable agent.
pub trait Agent: Send + Sync {
    /// Agent name; becomes the node id and the `transfer_to_<name>` suffix.
    fn name(&self) -> &str;

    /// Scoped system instructions for the agent's LLM turns.
    fn instructions(&self) -> &str;

    /// One-line summary shown to the supervisor when deciding where to route.
    fn summary(&self) -> &str;

    /// Builds the node that runs this agent.
    fn build(&self, llm: Arc<dyn LlmClient>) -> Arc<dyn Node<SupervisorState>>;
}

/// Ordered collection of agents; registration order is wiring order.
#[derive(Default)]
pub struct AgentRegistry {
    agents: Vec<Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an agent; names must be unique.
    pub fn register(&mut self, agent: Arc<dyn Agent>) -> Result<(), RegistryError> {
        if self.agents.iter().any(|a| a.name() == agent.name()) {
            return Err(RegistryError::Duplicate(agent.name().to_string()));
        }
        self.agents.push(agent);
        Ok(())
    }

    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }
}
