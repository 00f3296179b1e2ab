//! Bearer token loading for the Google tool wrappers.
//!
//! Token lifecycle (OAuth consent, refresh) is out of scope; the token is
//! read once from a cache file or the environment and sent as-is.

use serde_json::Value;

use crate::tools::ToolError;

/// A ready-to-use bearer token.
#[derive(Debug, Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    /// Wraps a raw access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Reads the token from an environment variable.
    pub fn from_env(var: &str) -> Result<Self, ToolError> {
        let token = std::env::var(var)
            .map_err(|_| ToolError::Auth(format!("env var {} not set", var)))?;
        if token.is_empty() {
            return Err(ToolError::Auth(format!("env var {} is empty", var)));
        }
        Ok(Self::new(token))
    }

    /// Reads the token from a JSON cache file (`access_token` or `token` field).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ToolError> {
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| ToolError::Auth(format!("cannot read token file: {}", e)))?;
        let json: Value = serde_json::from_str(&raw)
            .map_err(|e| ToolError::Auth(format!("token file is not JSON: {}", e)))?;
        let token = json["access_token"]
            .as_str()
            .or_else(|| json["token"].as_str())
            .ok_or_else(|| ToolError::Auth("token file has no access_token".into()))?;
        Ok(Self::new(token))
    }

    /// Authorization header value.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
