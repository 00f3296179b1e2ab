//! OpenAI-compatible clients (feature `openai`): chat completions and embeddings.
//!
//! `ChatOpenAI` implements `LlmClient` for supervisor/worker turns;
//! `OpenAIEmbedder` implements `recall::Embedder` for the memory service.
//! Requires `OPENAI_API_KEY` (or explicit config).

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, ToolChoiceMode, ToolSpec};
use crate::message::Message;
use crate::recall::{Embedder, RecallError};
use crate::state::ToolCall;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCalls, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage, ChatCompletionTool,
        ChatCompletionToolChoiceOption, ChatCompletionTools, CreateChatCompletionRequestArgs,
        FunctionObject, ToolChoiceOptions,
    },
    types::embeddings::CreateEmbeddingRequestArgs,
    Client,
};

/// OpenAI Chat Completions client implementing `LlmClient`.
///
/// Uses `OPENAI_API_KEY` from the environment by default; or provide config
/// via `ChatOpenAI::with_config` (custom key or base URL). Set tools to
/// enable tool_calls in the response.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    tools: Option<Vec<ToolSpec>>,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoiceMode>,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            tools: None,
            temperature: None,
            tool_choice: None,
        }
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            tools: None,
            temperature: None,
            tool_choice: None,
        }
    }

    /// Set tools for this completion (enables tool_calls in response).
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set tool choice mode (auto, none, required). Overrides API default when tools are present.
    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = Some(mode);
        self
    }

    /// Convert our `Message` list to OpenAI request messages.
    ///
    /// Tool messages become user-role observations; we never replay the
    /// assistant tool_call turns, so the request stays a valid sequence.
    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                ),
                Message::User(s) => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                ),
                Message::Assistant(s) => {
                    ChatCompletionRequestMessage::Assistant((s.as_str()).into())
                }
                Message::Tool { name, content } => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(
                        format!("Observation from {}: {}", name, content).as_str(),
                    ),
                ),
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let openai_messages = Self::messages_to_request(messages);
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(openai_messages);

        if let Some(ref tools) = self.tools {
            let chat_tools: Vec<ChatCompletionTools> = tools
                .iter()
                .map(|t| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: t.name.clone(),
                            description: Some(t.description.clone()),
                            parameters: Some(t.input_schema.clone()),
                            ..Default::default()
                        },
                    })
                })
                .collect();
            args.tools(chat_tools);
        }

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        if let Some(mode) = self.tool_choice {
            let opt = match mode {
                ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                ToolChoiceMode::None => ToolChoiceOptions::None,
                ToolChoiceMode::Required => ToolChoiceOptions::Required,
            };
            args.tool_choice(ChatCompletionToolChoiceOption::Mode(opt));
        }

        let request = args.build().map_err(|e| {
            AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
        })?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
        })?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| {
                if let ChatCompletionMessageToolCalls::Function(f) = tc {
                    Some(ToolCall {
                        id: f.id,
                        name: f.function.name,
                        arguments: f.function.arguments,
                    })
                } else {
                    None
                }
            })
            .collect();

        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }
}

/// OpenAI embeddings client implementing `recall::Embedder`.
///
/// The model is treated as an opaque text → vector function; `dims` must
/// match what the vector index was created with.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dims: usize,
}

impl OpenAIEmbedder {
    /// Build with default config; `dims` is requested from the API and used
    /// for the index mapping.
    pub fn new(model: impl Into<String>, dims: usize) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            dims,
        }
    }

    /// Build with custom config (e.g. custom base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>, dims: usize) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            dims,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RecallError> {
        let input: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(input)
            .dimensions(self.dims as u32)
            .build()
            .map_err(|e| RecallError::Embedding(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RecallError::Embedding(e.to_string()))?;

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Builder chain with_tools / with_temperature / with_tool_choice builds.
    #[test]
    fn chat_openai_builder_chain() {
        let config = OpenAIConfig::new().with_api_key("test-key");
        let _ = ChatOpenAI::with_config(config, "gpt-4o-mini")
            .with_tools(vec![ToolSpec::text_input("gmail", "mail ops")])
            .with_temperature(0.2)
            .with_tool_choice(ToolChoiceMode::Auto);
    }

    /// **Scenario**: Tool messages are rendered as user-role observations.
    #[test]
    fn tool_messages_become_observations() {
        let msgs = vec![Message::Tool {
            name: "search".into(),
            content: "three results".into(),
        }];
        let request = ChatOpenAI::messages_to_request(&msgs);
        assert_eq!(request.len(), 1);
        assert!(matches!(
            request[0],
            ChatCompletionRequestMessage::User(_)
        ));
    }
}
