//! Anthropic Messages API adapter.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ParlanceError;
use crate::types::*;

use super::http::{anthropic_headers, shared_client};
use super::ChatProvider;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// The API requires max_tokens on every request.
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct AnthropicProvider {
    model_id: String,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(model_id: String, api_key: String, base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model_id,
            api_key,
        }
    }

    fn build_request_body(
        &self,
        messages: &[ModelMessage],
        options: &CompletionOptions,
    ) -> serde_json::Value {
        let mut system_parts = Vec::new();
        let mut wire_messages = Vec::new();

        for msg in messages {
            match msg.role {
                // System messages are modeled out-of-band.
                Role::System => {
                    system_parts.push(msg.text());
                }
                Role::User => {
                    let content = build_user_content(&msg.content);
                    wire_messages.push(serde_json::json!({
                        "role": "user",
                        "content": content,
                    }));
                }
                Role::Assistant => {
                    let mut content: Vec<serde_json::Value> = Vec::new();
                    for part in &msg.content {
                        match part {
                            ContentPart::Text { text } => {
                                if !text.is_empty() {
                                    content.push(serde_json::json!({"type": "text", "text": text}));
                                }
                            }
                            ContentPart::ToolCall(tc) => {
                                content.push(serde_json::json!({
                                    "type": "tool_use",
                                    "id": tc.id,
                                    "name": tc.name,
                                    "input": tc.arguments,
                                }));
                            }
                            _ => {}
                        }
                    }

                    if content.is_empty() {
                        let text = msg.text();
                        if !text.is_empty() {
                            wire_messages.push(serde_json::json!({
                                "role": "assistant",
                                "content": text,
                            }));
                        }
                    } else {
                        wire_messages.push(serde_json::json!({
                            "role": "assistant",
                            "content": content,
                        }));
                    }
                }
                // Tool results are re-encoded as user-role tool_result blocks.
                Role::Tool => {
                    for part in &msg.content {
                        if let ContentPart::ToolResult(tr) = part {
                            wire_messages.push(serde_json::json!({
                                "role": "user",
                                "content": [{
                                    "type": "tool_result",
                                    "tool_use_id": tr.tool_call_id,
                                    "content": tr.content,
                                }],
                            }));
                        }
                    }
                }
            }
        }

        // No native response_format: a JSON-schema target becomes a system
        // instruction the model must follow.
        if let Some(ResponseFormat::JsonSchema {
            ref name,
            ref schema,
            ..
        }) = options.response_format
        {
            system_parts.push(format!(
                "You must respond with ONLY valid JSON (no markdown, no explanation) for `{name}` matching this schema:\n```json\n{}\n```",
                serde_json::to_string_pretty(schema).unwrap_or_default()
            ));
        }

        let mut body = serde_json::json!({
            "model": self.model_id,
            "messages": wire_messages,
            "max_tokens": DEFAULT_MAX_TOKENS,
        });

        let obj = body.as_object_mut().expect("body is an object");

        if !system_parts.is_empty() {
            obj.insert("system".into(), system_parts.join("\n").into());
        }

        if !options.tools.is_empty() {
            let tool_defs: Vec<serde_json::Value> = options
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.parameters,
                    })
                })
                .collect();
            obj.insert("tools".into(), tool_defs.into());
        }

        body
    }
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete_chat(
        &self,
        messages: &[ModelMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResult, ParlanceError> {
        let body = self.build_request_body(messages, options);
        let url = format!("{}/messages", self.base_url);

        debug!(model = %self.model_id, "Anthropic complete_chat");

        let resp = shared_client()
            .post(&url)
            .headers(anthropic_headers(&self.api_key, API_VERSION))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(super::http::status_to_error(status, &body_text));
        }

        let data: AnthropicResponse = resp.json().await?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for block in &data.content {
            match block.r#type.as_str() {
                "text" => {
                    if let Some(ref t) = block.text {
                        content.push_str(t);
                    }
                }
                "tool_use" => {
                    if let (Some(ref id), Some(ref name), Some(ref input)) =
                        (&block.id, &block.name, &block.input)
                    {
                        tool_calls.push(ToolCall {
                            id: id.clone(),
                            name: name.clone(),
                            arguments: input.clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        let finish_reason = match data.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
            Some("max_tokens") => FinishReason::MaxTokens,
            Some("tool_use") => FinishReason::ToolCalls,
            other => {
                return Err(ParlanceError::protocol(format!(
                    "Unrecognized Anthropic stop reason: {other:?}"
                )))
            }
        };

        Ok(CompletionResult {
            content,
            tool_calls,
            finish_reason,
        })
    }
}

fn build_user_content(parts: &[ContentPart]) -> serde_json::Value {
    if parts.len() == 1 {
        if let ContentPart::Text { ref text } = parts[0] {
            return serde_json::Value::String(text.clone());
        }
    }

    let content: Vec<serde_json::Value> = parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } => Some(serde_json::json!({
                "type": "text",
                "text": text,
            })),
            ContentPart::Image(img) => Some(serde_json::json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": img.mime_type,
                    "data": img.data,
                }
            })),
            _ => None,
        })
        .collect();

    serde_json::json!(content)
}

// Internal Anthropic response types

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(
            "claude-sonnet-4-20250514".to_string(),
            "test-key".to_string(),
            None,
        )
    }

    #[test]
    fn system_message_is_split_out_of_band() {
        let messages = vec![ModelMessage::system("be brief"), ModelMessage::user("hi")];
        let body = provider().build_request_body(&messages, &CompletionOptions::default());
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn tool_result_becomes_user_role_block() {
        let messages = vec![ModelMessage::tool_result("toolu_1", "\"sunny\"")];
        let body = provider().build_request_body(&messages, &CompletionOptions::default());
        let msg = &body["messages"][0];
        assert_eq!(msg["role"], "user");
        assert_eq!(msg["content"][0]["type"], "tool_result");
        assert_eq!(msg["content"][0]["tool_use_id"], "toolu_1");
        assert_eq!(msg["content"][0]["content"], "\"sunny\"");
    }

    #[test]
    fn tools_use_input_schema_key() {
        let options = CompletionOptions {
            response_format: None,
            tools: vec![ToolDefinition {
                name: "get_weather".to_string(),
                description: "Get weather".to_string(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }],
        };
        let body = provider().build_request_body(&[ModelMessage::user("hi")], &options);
        assert_eq!(body["tools"][0]["name"], "get_weather");
        assert!(body["tools"][0]["input_schema"].is_object());
        assert!(body["tools"][0].get("parameters").is_none());
    }

    #[test]
    fn json_schema_format_becomes_system_instruction() {
        let options = CompletionOptions {
            response_format: Some(ResponseFormat::JsonSchema {
                name: "WeatherReport".to_string(),
                description: String::new(),
                schema: serde_json::json!({"type": "object", "properties": {}}),
            }),
            tools: Vec::new(),
        };
        let body = provider().build_request_body(&[ModelMessage::user("hi")], &options);
        let system = body["system"].as_str().unwrap();
        assert!(system.contains("ONLY valid JSON"));
        assert!(system.contains("WeatherReport"));
    }

    #[test]
    fn assistant_tool_calls_become_tool_use_blocks() {
        let msg = ModelMessage {
            role: Role::Assistant,
            content: vec![ContentPart::ToolCall(ToolCall {
                id: "toolu_1".to_string(),
                name: "get_weather".to_string(),
                arguments: serde_json::json!({"city": "Paris"}),
            })],
            timestamp: None,
        };
        let body = provider().build_request_body(&[msg], &CompletionOptions::default());
        let block = &body["messages"][0]["content"][0];
        assert_eq!(block["type"], "tool_use");
        assert_eq!(block["input"]["city"], "Paris");
    }

    #[test]
    fn image_parts_use_base64_source_blocks() {
        let messages = vec![ModelMessage::user_with_image(
            "what is this?",
            "aGVsbG8=".to_string(),
            "image/png".to_string(),
        )];
        let body = provider().build_request_body(&messages, &CompletionOptions::default());
        let block = &body["messages"][0]["content"][1];
        assert_eq!(block["type"], "image");
        assert_eq!(block["source"]["type"], "base64");
        assert_eq!(block["source"]["media_type"], "image/png");
    }
}
