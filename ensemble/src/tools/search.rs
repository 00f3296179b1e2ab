//! Web search tool over the Custom Search JSON API.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::tools::{Tool, ToolError};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const DEFAULT_NUM_RESULTS: usize = 5;

/// Web search tool. The input string is the query itself; no operation
/// prefix grammar here.
pub struct GoogleSearchTool {
    client: reqwest::Client,
    api_key: String,
    engine_id: String,
    base_url: String,
    num_results: usize,
}

impl GoogleSearchTool {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            num_results: DEFAULT_NUM_RESULTS,
        }
    }

    /// Reads `GOOGLE_API_KEY` and `GOOGLE_CSE_ID` from the environment.
    pub fn from_env() -> Result<Self, ToolError> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .map_err(|_| ToolError::Auth("GOOGLE_API_KEY not set".into()))?;
        let engine_id = std::env::var("GOOGLE_CSE_ID")
            .map_err(|_| ToolError::Auth("GOOGLE_CSE_ID not set".into()))?;
        Ok(Self::new(api_key, engine_id))
    }

    /// Overrides the API base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results.max(1);
        self
    }

    /// Renders the result items one per block: title, link, snippet.
    pub(crate) fn format_results(items: &[Value]) -> String {
        if items.is_empty() {
            return "No results found.".to_string();
        }
        items
            .iter()
            .map(|item| {
                format!(
                    "{}\n{}\n{}",
                    item["title"].as_str().unwrap_or(""),
                    item["link"].as_str().unwrap_or(""),
                    item["snippet"].as_str().unwrap_or(""),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl Tool for GoogleSearchTool {
    fn name(&self) -> &str {
        "gsearch"
    }

    fn description(&self) -> &str {
        "Search the web. Input is the search query; returns the top results as \
         title, link, and snippet."
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::BadArguments("provide a search query".into()));
        }
        let num = self.num_results.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api(format!("{}: {}", status, body)));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let items = body["items"].as_array().cloned().unwrap_or_default();
        debug!(query, count = items.len(), "web search");
        Ok(Self::format_results(&items))
    }
}
