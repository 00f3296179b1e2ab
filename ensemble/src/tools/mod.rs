//! Uniform tool interface over vendor APIs.
//!
//! Every tool takes one input string in `operation:args` form and returns a
//! plain-text result. Parsing is pure and unit-tested; HTTP happens only
//! behind the parsed operation.

#[cfg(feature = "google")]
mod auth;
#[cfg(feature = "google")]
mod gcalendar;
#[cfg(feature = "google")]
mod gdrive;
#[cfg(feature = "google")]
mod gmail;
#[cfg(feature = "google")]
mod search;

#[cfg(feature = "google")]
pub use auth::BearerToken;
#[cfg(feature = "google")]
pub use gcalendar::CalendarTool;
#[cfg(feature = "google")]
pub use gdrive::DriveTool;
#[cfg(feature = "google")]
pub use gmail::GmailTool;
#[cfg(feature = "google")]
pub use search::GoogleSearchTool;

use async_trait::async_trait;
use thiserror::Error;

/// Tool failure. Worker nodes render these as error strings back to the
/// model rather than aborting the run.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The operation prefix was not recognized.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// The operation was recognized but its arguments were malformed.
    #[error("bad arguments: {0}")]
    BadArguments(String),
    /// Missing or unusable credentials.
    #[error("auth failed: {0}")]
    Auth(String),
    /// The vendor API call itself failed.
    #[error("api call failed: {0}")]
    Api(String),
}

/// One callable tool behind the uniform string interface.
///
/// **Interaction**: `WorkerNode` calls `call` with the model-provided input
/// and appends the result as a `Message::Tool`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name as exposed to the model.
    fn name(&self) -> &str;

    /// Description handed to the model; documents the operation grammar.
    fn description(&self) -> &str;

    /// Executes one operation.
    async fn call(&self, input: &str) -> Result<String, ToolError>;
}
