//! Gmail tool: search, draft, and send mail over the Gmail REST API.
//!
//! Operation grammar (comma-separated fields; commas in the body stay in the
//! body):
//!
//! - `search_messages:<query>`
//! - `create_draft:<sender>,<to>,<subject>,<body>`
//! - `send_message:<sender>,<to>,<subject>,<body>`

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde_json::{json, Value};
use tracing::debug;

use crate::tools::{BearerToken, Tool, ToolError};

const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Parsed Gmail operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GmailOp {
    Search {
        query: String,
    },
    CreateDraft {
        sender: String,
        to: String,
        subject: String,
        body: String,
    },
    Send {
        sender: String,
        to: String,
        subject: String,
        body: String,
    },
}

/// Parses the uniform input string into an operation. Pure.
pub(crate) fn parse_operation(input: &str) -> Result<GmailOp, ToolError> {
    if let Some(query) = input.strip_prefix("search_messages:") {
        return Ok(GmailOp::Search {
            query: query.trim().to_string(),
        });
    }
    let (draft, rest) = if let Some(rest) = input.strip_prefix("create_draft:") {
        (true, rest)
    } else if let Some(rest) = input.strip_prefix("send_message:") {
        (false, rest)
    } else {
        return Err(ToolError::UnsupportedOperation(input.to_string()));
    };

    // splitn keeps commas inside the body intact.
    let mut parts = rest.splitn(4, ',');
    let (sender, to, subject, body) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(sender), Some(to), Some(subject), Some(body)) => (
            sender.trim().to_string(),
            to.trim().to_string(),
            subject.trim().to_string(),
            body.trim().to_string(),
        ),
        _ => {
            return Err(ToolError::BadArguments(
                "provide sender, to, subject, and body separated by commas".into(),
            ))
        }
    };
    Ok(if draft {
        GmailOp::CreateDraft {
            sender,
            to,
            subject,
            body,
        }
    } else {
        GmailOp::Send {
            sender,
            to,
            subject,
            body,
        }
    })
}

/// Builds the base64url-encoded RFC 2822 message Gmail expects in `raw`.
pub(crate) fn encode_raw(sender: &str, to: &str, subject: &str, body: &str) -> String {
    let mime = format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{}",
        sender, to, subject, body
    );
    URL_SAFE.encode(mime.as_bytes())
}

/// Gmail tool over the REST API.
pub struct GmailTool {
    client: reqwest::Client,
    token: BearerToken,
    base_url: String,
}

impl GmailTool {
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

    async fn search_messages(&self, query: &str) -> Result<String, ToolError> {
        let response = self
            .client
            .get(format!("{}/users/me/messages", self.base_url))
            .query(&[("q", query)])
            .header("Authorization", self.token.header_value())
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let body: Value = Self::json_or_error(response).await?;
        let messages = body["messages"].as_array().cloned().unwrap_or_default();
        debug!(query, count = messages.len(), "gmail search");
        Ok(format!(
            "Found {} messages:\n{}",
            messages.len(),
            serde_json::to_string_pretty(&messages).unwrap_or_default()
        ))
    }

    async fn create_draft(
        &self,
        sender: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, ToolError> {
        let raw = encode_raw(sender, to, subject, body);
        let response = self
            .client
            .post(format!("{}/users/me/drafts", self.base_url))
            .header("Authorization", self.token.header_value())
            .json(&json!({ "message": { "raw": raw } }))
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let draft: Value = Self::json_or_error(response).await?;
        Ok(format!(
            "Draft created: {}",
            serde_json::to_string_pretty(&draft).unwrap_or_default()
        ))
    }

    async fn send_message(
        &self,
        sender: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, ToolError> {
        let raw = encode_raw(sender, to, subject, body);
        let response = self
            .client
            .post(format!("{}/users/me/messages/send", self.base_url))
            .header("Authorization", self.token.header_value())
            .json(&json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let message: Value = Self::json_or_error(response).await?;
        Ok(format!(
            "Message sent: {}",
            serde_json::to_string_pretty(&message).unwrap_or_default()
        ))
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
}

#[async_trait]
impl Tool for GmailTool {
    fn name(&self) -> &str {
        "gmail"
    }

    fn description(&self) -> &str {
        "Interact with Gmail: search for emails, create drafts, and send messages. \
         Operations:\n\
         1. search_messages:<query> - Search for messages matching the query.\n\
         2. create_draft:<sender>,<to>,<subject>,<body> - Create a draft message.\n\
         3. send_message:<sender>,<to>,<subject>,<body> - Send a message.\n\
         Separate fields with commas; commas in the body are kept as part of the body."
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        match parse_operation(input)? {
            GmailOp::Search { query } => self.search_messages(&query).await,
            GmailOp::CreateDraft {
                sender,
                to,
                subject,
                body,
            } => self.create_draft(&sender, &to, &subject, &body).await,
            GmailOp::Send {
                sender,
                to,
                subject,
                body,
            } => self.send_message(&sender, &to, &subject, &body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: search_messages keeps the whole query, including colons.
    #[test]
    fn parse_search() {
        let op = parse_operation("search_messages:subject: Quarterly Report").unwrap();
        assert_eq!(
            op,
            GmailOp::Search {
                query: "subject: Quarterly Report".into()
            }
        );
    }

    /// **Scenario**: Commas beyond the third stay in the body.
    #[test]
    fn parse_send_body_keeps_commas() {
        let op =
            parse_operation("send_message:me@x.com,you@y.com,Hi,first, second, third").unwrap();
        match op {
            GmailOp::Send { body, subject, .. } => {
                assert_eq!(subject, "Hi");
                assert_eq!(body, "first, second, third");
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }

    /// **Scenario**: Too few fields is BadArguments; unknown prefix is UnsupportedOperation.
    #[test]
    fn parse_errors() {
        assert!(matches!(
            parse_operation("create_draft:a,b,c"),
            Err(ToolError::BadArguments(_))
        ));
        assert!(matches!(
            parse_operation("delete_everything:now"),
            Err(ToolError::UnsupportedOperation(_))
        ));
    }

    /// **Scenario**: encode_raw produces base64url that decodes back to the MIME text.
    #[test]
    fn encode_raw_roundtrip() {
        let raw = encode_raw("a@x.com", "b@y.com", "Sub", "Hello, world");
        let decoded = URL_SAFE.decode(raw.as_bytes()).unwrap();
        let text = String::from_utf8(decoded).unwrap();
        assert!(text.starts_with("From: a@x.com\r\nTo: b@y.com\r\nSubject: Sub\r\n"));
        assert!(text.ends_with("\r\n\r\nHello, world"));
    }
}
