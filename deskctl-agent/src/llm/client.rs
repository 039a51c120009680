//! Blocking Anthropic messages-API client.

use serde_json::{json, Value};

use deskctl::ToolDefinition;

use crate::llm::messages::{ContentBlock, Message};
use crate::{Error, Result};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// One parsed API turn.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
}

impl ApiResponse {
    /// True while the model is still asking for tool executions.
    pub fn wants_tools(&self) -> bool {
        self.stop_reason.as_deref() == Some("tool_use")
    }
}

pub struct AnthropicClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        AnthropicClient {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the conversation and returns the assistant's content blocks.
    pub fn send(
        &self,
        system: &str,
        tools: &[ToolDefinition],
        messages: &[Message],
    ) -> Result<ApiResponse> {
        let tools_json: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.input_schema,
                })
            })
            .collect();

        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "tools": tools_json,
            "messages": messages,
        });

        tracing::debug!(model = %self.model, messages = messages.len(), "sending messages request");
        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::LlmApiError(format!(
                "API returned {status}: {error_text}"
            )));
        }

        let value: Value = response.json()?;
        Ok(parse_response(&value))
    }
}

/// Pulls the known block types out of a response body, skipping anything
/// this client does not model.
fn parse_response(value: &Value) -> ApiResponse {
    let stop_reason = value
        .get("stop_reason")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut content = Vec::new();
    if let Some(blocks) = value.get("content").and_then(Value::as_array) {
        for block in blocks {
            match block.get("type").and_then(Value::as_str) {
                Some("text") => {
                    if let Some(text) = block.get("text").and_then(Value::as_str) {
                        content.push(ContentBlock::Text {
                            text: text.to_string(),
                        });
                    }
                }
                Some("tool_use") => {
                    let id = block.get("id").and_then(Value::as_str);
                    let name = block.get("name").and_then(Value::as_str);
                    if let (Some(id), Some(name)) = (id, name) {
                        content.push(ContentBlock::ToolUse {
                            id: id.to_string(),
                            name: name.to_string(),
                            input: block.get("input").cloned().unwrap_or(Value::Null),
                        });
                    }
                }
                other => {
                    tracing::trace!(block_type = ?other, "skipping content block");
                }
            }
        }
    }

    ApiResponse {
        content,
        stop_reason,
    }
}
