//! Drive tool: list files, read metadata and content, manage sharing.
//!
//! Operation grammar:
//!
//! - `list_files:<max_results>` (defaults to 10)
//! - `load_metadata:<file_id>`
//! - `load_content:<file_id>`
//! - `update_sharing:<file_id>,<email>,<role>` (role: reader/commenter/writer)

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::tools::{BearerToken, Tool, ToolError};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_MAX_RESULTS: usize = 10;

/// Parsed Drive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DriveOp {
    List { max_results: usize },
    Metadata { file_id: String },
    Content { file_id: String },
    Share { file_id: String, email: String, role: String },
}

/// Parses the uniform input string into an operation. Pure.
pub(crate) fn parse_operation(input: &str) -> Result<DriveOp, ToolError> {
    if let Some(rest) = input.strip_prefix("list_files") {
        let max_results = rest
            .strip_prefix(':')
            .map(str::trim)
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_RESULTS);
        return Ok(DriveOp::List { max_results });
    }
    if let Some(rest) = input.strip_prefix("load_metadata:") {
        let file_id = rest.trim();
        if file_id.is_empty() {
            return Err(ToolError::BadArguments("provide a file id".into()));
        }
        return Ok(DriveOp::Metadata {
            file_id: file_id.to_string(),
        });
    }
    if let Some(rest) = input.strip_prefix("load_content:") {
        let file_id = rest.trim();
        if file_id.is_empty() {
            return Err(ToolError::BadArguments("provide a file id".into()));
        }
        return Ok(DriveOp::Content {
            file_id: file_id.to_string(),
        });
    }
    if let Some(rest) = input.strip_prefix("update_sharing:") {
        let parts: Vec<&str> = rest.split(',').map(str::trim).collect();
        if parts.len() < 3 {
            return Err(ToolError::BadArguments(
                "provide file_id, email, and role separated by commas".into(),
            ));
        }
        return Ok(DriveOp::Share {
            file_id: parts[0].to_string(),
            email: parts[1].to_string(),
            role: parts[2].to_string(),
        });
    }
    Err(ToolError::UnsupportedOperation(input.to_string()))
}

/// Drive tool over the REST API.
pub struct DriveTool {
    client: reqwest::Client,
    token: BearerToken,
    base_url: String,
}

impl DriveTool {
    pub fn new(token: BearerToken) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn json_or_error(response: reqwest::Response) -> Result<Value, ToolError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api(format!("{}: {}", status, body)));
        }
        response
            .json()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))
    }

    async fn list_files(&self, max_results: usize) -> Result<String, ToolError> {
        let response = self
            .client
            .get(format!("{}/files", self.base_url))
            .query(&[
                ("pageSize", max_results.to_string()),
                ("fields", "files(id, name, mimeType)".to_string()),
            ])
            .header("Authorization", self.token.header_value())
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let body = Self::json_or_error(response).await?;
        let files = body["files"].as_array().cloned().unwrap_or_default();
        debug!(count = files.len(), "drive list");
        Ok(format!(
            "Found {} files:\n{}",
            files.len(),
            serde_json::to_string_pretty(&files).unwrap_or_default()
        ))
    }

    async fn load_metadata(&self, file_id: &str) -> Result<String, ToolError> {
        let response = self
            .client
            .get(format!("{}/files/{}", self.base_url, file_id))
            .query(&[("fields", "*")])
            .header("Authorization", self.token.header_value())
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let metadata = Self::json_or_error(response).await?;
        Ok(format!(
            "Metadata:\n{}",
            serde_json::to_string_pretty(&metadata).unwrap_or_default()
        ))
    }

    async fn load_content(&self, file_id: &str) -> Result<String, ToolError> {
        let response = self
            .client
            .get(format!("{}/files/{}", self.base_url, file_id))
            .query(&[("alt", "media")])
            .header("Authorization", self.token.header_value())
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api(format!("{}: {}", status, body)));
        }
        response
            .text()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))
    }

    async fn update_sharing(
        &self,
        file_id: &str,
        email: &str,
        role: &str,
    ) -> Result<String, ToolError> {
        let response = self
            .client
            .post(format!("{}/files/{}/permissions", self.base_url, file_id))
            .header("Authorization", self.token.header_value())
            .json(&json!({
                "type": "user",
                "role": role,
                "emailAddress": email,
            }))
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let permission = Self::json_or_error(response).await?;
        Ok(format!(
            "Sharing updated:\n{}",
            serde_json::to_string_pretty(&permission).unwrap_or_default()
        ))
    }
}

#[async_trait]
impl Tool for DriveTool {
    fn name(&self) -> &str {
        "gdrive"
    }

    fn description(&self) -> &str {
        "Interact with Google Drive: list files, load metadata, load file content, and update \
         sharing permissions. Operations:\n\
         1. list_files:<max_results> - List files (default 10).\n\
         2. load_metadata:<file_id> - Load a file's metadata.\n\
         3. load_content:<file_id> - Load a file's content.\n\
         4. update_sharing:<file_id>,<email>,<role> - Grant email the given role."
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        match parse_operation(input)? {
            DriveOp::List { max_results } => self.list_files(max_results).await,
            DriveOp::Metadata { file_id } => self.load_metadata(&file_id).await,
            DriveOp::Content { file_id } => self.load_content(&file_id).await,
            DriveOp::Share {
                file_id,
                email,
                role,
            } => self.update_sharing(&file_id, &email, &role).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Every operation prefix parses into its variant.
    #[test]
    fn parse_all_ops() {
        assert_eq!(
            parse_operation("list_files:3").unwrap(),
            DriveOp::List { max_results: 3 }
        );
        assert_eq!(
            parse_operation("load_metadata:f123").unwrap(),
            DriveOp::Metadata { file_id: "f123".into() }
        );
        assert_eq!(
            parse_operation("load_content: f123 ").unwrap(),
            DriveOp::Content { file_id: "f123".into() }
        );
        assert_eq!(
            parse_operation("update_sharing:f123,a@b.com,reader").unwrap(),
            DriveOp::Share {
                file_id: "f123".into(),
                email: "a@b.com".into(),
                role: "reader".into(),
            }
        );
    }

    /// **Scenario**: Missing ids/fields map to BadArguments; unknown prefixes to UnsupportedOperation.
    #[test]
    fn parse_errors() {
        assert!(matches!(
            parse_operation("load_metadata:"),
            Err(ToolError::BadArguments(_))
        ));
        assert!(matches!(
            parse_operation("update_sharing:f123,a@b.com"),
            Err(ToolError::BadArguments(_))
        ));
        assert!(matches!(
            parse_operation("defragment:f123"),
            Err(ToolError::UnsupportedOperation(_))
        ));
    }
}
