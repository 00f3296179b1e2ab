//! Calendar tool: list, create, and update events on the primary calendar.
//!
//! Operation grammar:
//!
//! - `list_events:<max_results>` (defaults to 10 when missing or non-numeric)
//! - `create_event:<summary>,<start>,<end>` (RFC3339 times)
//! - `update_event:<event_id>,<summary>,<start>,<end>`

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::tools::{BearerToken, Tool, ToolError};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const DEFAULT_MAX_RESULTS: usize = 10;

/// Parsed Calendar operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CalendarOp {
    List {
        max_results: usize,
    },
    Create {
        summary: String,
        start: String,
        end: String,
    },
    Update {
        event_id: String,
        summary: String,
        start: String,
        end: String,
    },
}

/// Parses the uniform input string into an operation. Pure.
pub(crate) fn parse_operation(input: &str) -> Result<CalendarOp, ToolError> {
    if let Some(rest) = input.strip_prefix("list_events") {
        let max_results = rest
            .strip_prefix(':')
            .map(str::trim)
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_RESULTS);
        return Ok(CalendarOp::List { max_results });
    }
    if let Some(rest) = input.strip_prefix("create_event:") {
        let parts: Vec<&str> = rest.split(',').map(str::trim).collect();
        if parts.len() < 3 {
            return Err(ToolError::BadArguments(
                "provide summary, start_time, and end_time separated by commas".into(),
            ));
        }
        return Ok(CalendarOp::Create {
            summary: parts[0].to_string(),
            start: parts[1].to_string(),
            end: parts[2].to_string(),
        });
    }
    if let Some(rest) = input.strip_prefix("update_event:") {
        let parts: Vec<&str> = rest.split(',').map(str::trim).collect();
        if parts.len() < 4 {
            return Err(ToolError::BadArguments(
                "provide event_id, summary, start_time, and end_time separated by commas".into(),
            ));
        }
        return Ok(CalendarOp::Update {
            event_id: parts[0].to_string(),
            summary: parts[1].to_string(),
            start: parts[2].to_string(),
            end: parts[3].to_string(),
        });
    }
    Err(ToolError::UnsupportedOperation(input.to_string()))
}

/// Calendar tool over the REST API.
pub struct CalendarTool {
    client: reqwest::Client,
    token: BearerToken,
    base_url: String,
}

impl CalendarTool {
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

    fn events_url(&self) -> String {
        format!("{}/calendars/primary/events", self.base_url)
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

    async fn list_events(&self, max_results: usize) -> Result<String, ToolError> {
        let response = self
            .client
            .get(self.events_url())
            .query(&[
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .header("Authorization", self.token.header_value())
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let body = Self::json_or_error(response).await?;
        let events = body["items"].as_array().cloned().unwrap_or_default();
        debug!(count = events.len(), "calendar list");
        Ok(format!(
            "Found {} events:\n{}",
            events.len(),
            serde_json::to_string_pretty(&events).unwrap_or_default()
        ))
    }

    async fn create_event(
        &self,
        summary: &str,
        start: &str,
        end: &str,
    ) -> Result<String, ToolError> {
        let response = self
            .client
            .post(self.events_url())
            .header("Authorization", self.token.header_value())
            .json(&json!({
                "summary": summary,
                "start": { "dateTime": start },
                "end": { "dateTime": end },
            }))
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let event = Self::json_or_error(response).await?;
        Ok(format!(
            "Event created:\n{}",
            serde_json::to_string_pretty(&event).unwrap_or_default()
        ))
    }

    async fn update_event(
        &self,
        event_id: &str,
        summary: &str,
        start: &str,
        end: &str,
    ) -> Result<String, ToolError> {
        let url = format!("{}/{}", self.events_url(), event_id);
        // Fetch-then-update keeps fields we do not manage.
        let current = self
            .client
            .get(&url)
            .header("Authorization", self.token.header_value())
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let mut event = Self::json_or_error(current).await?;
        event["summary"] = json!(summary);
        event["start"] = json!({ "dateTime": start });
        event["end"] = json!({ "dateTime": end });

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.token.header_value())
            .json(&event)
            .send()
            .await
            .map_err(|e| ToolError::Api(e.to_string()))?;
        let updated = Self::json_or_error(response).await?;
        Ok(format!(
            "Event updated:\n{}",
            serde_json::to_string_pretty(&updated).unwrap_or_default()
        ))
    }
}

#[async_trait]
impl Tool for CalendarTool {
    fn name(&self) -> &str {
        "calendar"
    }

    fn description(&self) -> &str {
        "Interact with Google Calendar: list upcoming events, create new events, and update \
         existing events. Operations:\n\
         1. list_events:<max_results> - List upcoming events (default 10).\n\
         2. create_event:<summary>,<start_time>,<end_time> - Create an event; RFC3339 times.\n\
         3. update_event:<event_id>,<summary>,<start_time>,<end_time> - Update an event.\n\
         Separate fields with commas."
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        match parse_operation(input)? {
            CalendarOp::List { max_results } => self.list_events(max_results).await,
            CalendarOp::Create {
                summary,
                start,
                end,
            } => self.create_event(&summary, &start, &end).await,
            CalendarOp::Update {
                event_id,
                summary,
                start,
                end,
            } => self.update_event(&event_id, &summary, &start, &end).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: list_events parses the count and defaults on missing/garbage input.
    #[test]
    fn parse_list_defaults() {
        assert_eq!(
            parse_operation("list_events:5").unwrap(),
            CalendarOp::List { max_results: 5 }
        );
        assert_eq!(
            parse_operation("list_events").unwrap(),
            CalendarOp::List { max_results: 10 }
        );
        assert_eq!(
            parse_operation("list_events:lots").unwrap(),
            CalendarOp::List { max_results: 10 }
        );
    }

    /// **Scenario**: create_event requires three fields; update_event requires four.
    #[test]
    fn parse_field_counts() {
        assert!(matches!(
            parse_operation("create_event:Standup,2026-01-01T09:00:00"),
            Err(ToolError::BadArguments(_))
        ));
        let op = parse_operation(
            "update_event:ev1,Standup,2026-01-01T09:00:00,2026-01-01T09:30:00",
        )
        .unwrap();
        assert_eq!(
            op,
            CalendarOp::Update {
                event_id: "ev1".into(),
                summary: "Standup".into(),
                start: "2026-01-01T09:00:00".into(),
                end: "2026-01-01T09:30:00".into(),
            }
        );
    }

    /// **Scenario**: Unknown prefix maps to UnsupportedOperation.
    #[test]
    fn parse_unknown_op() {
        assert!(matches!(
            parse_operation("cancel_everything:today"),
            Err(ToolError::UnsupportedOperation(_))
        ));
    }
}
