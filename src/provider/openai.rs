//! OpenAI Chat Completions API adapter.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ParlanceError;
use crate::types::*;

use super::http::{bearer_headers, shared_client};
use super::ChatProvider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    model_id: String,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
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
        let messages = messages.iter().map(message_to_openai).collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": self.model_id,
            "messages": messages,
        });

        let obj = body.as_object_mut().expect("body is an object");

        if !options.tools.is_empty() {
            let tool_defs: Vec<serde_json::Value> = options
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            obj.insert("tools".into(), tool_defs.into());
        }

        if let Some(ResponseFormat::JsonSchema {
            ref name,
            ref description,
            ref schema,
        }) = options.response_format
        {
            obj.insert(
                "response_format".into(),
                serde_json::json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": name,
                        "description": description,
                        "schema": schema,
                        "strict": true,
                    }
                }),
            );
        }

        body
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model_id, "OpenAI complete_chat");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(super::http::status_to_error(status, &body_text));
        }

        let data: OpenAiChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ParlanceError::protocol("No choices in OpenAI response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments)),
            })
            .collect();

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::MaxTokens,
            Some("tool_calls") => FinishReason::ToolCalls,
            Some("content_filter") => FinishReason::ContentFilter,
            other => {
                return Err(ParlanceError::protocol(format!(
                    "Unrecognized OpenAI finish reason: {other:?}"
                )))
            }
        };

        Ok(CompletionResult {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            finish_reason,
        })
    }
}

fn message_to_openai(msg: &ModelMessage) -> serde_json::Value {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    // Simple single-part message
    if msg.content.len() == 1 {
        if let ContentPart::Text { ref text } = msg.content[0] {
            return serde_json::json!({ "role": role, "content": text });
        }
        if let ContentPart::ToolResult(ref tr) = msg.content[0] {
            return serde_json::json!({
                "role": "tool",
                "tool_call_id": tr.tool_call_id,
                "content": tr.content,
            });
        }
    }

    // Assistant turn with tool calls
    let tool_calls: Vec<&ToolCall> = msg.tool_calls();
    if !tool_calls.is_empty() {
        let tc_json: Vec<serde_json::Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments.to_string(),
                    }
                })
            })
            .collect();
        let text = msg.text();
        return serde_json::json!({
            "role": role,
            "content": if text.is_empty() { serde_json::Value::Null } else { serde_json::Value::String(text) },
            "tool_calls": tc_json,
        });
    }

    // Multi-part content (text + images)
    let parts: Vec<serde_json::Value> = msg
        .content
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } => Some(serde_json::json!({
                "type": "text",
                "text": text,
            })),
            ContentPart::Image(img) => Some(serde_json::json!({
                "type": "image_url",
                "image_url": { "url": format!("data:{};base64,{}", img.mime_type, img.data) }
            })),
            _ => None,
        })
        .collect();

    serde_json::json!({ "role": role, "content": parts })
}

// OpenAI API response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new("gpt-4o".to_string(), "test-key".to_string(), None)
    }

    #[test]
    fn request_body_declares_tools_in_function_format() {
        let options = CompletionOptions {
            response_format: None,
            tools: vec![ToolDefinition {
                name: "get_weather".to_string(),
                description: "Get weather".to_string(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }],
        };
        let body = provider().build_request_body(&[ModelMessage::user("hello")], &options);
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "get_weather");
    }

    #[test]
    fn request_body_carries_strict_json_schema_format() {
        let options = CompletionOptions {
            response_format: Some(ResponseFormat::JsonSchema {
                name: "WeatherReport".to_string(),
                description: "A weather report".to_string(),
                schema: serde_json::json!({"type": "object", "properties": {}}),
            }),
            tools: Vec::new(),
        };
        let body = provider().build_request_body(&[ModelMessage::user("hello")], &options);
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "WeatherReport");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn system_message_stays_inline() {
        let messages = vec![ModelMessage::system("be brief"), ModelMessage::user("hi")];
        let body = provider().build_request_body(&messages, &CompletionOptions::default());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
    }

    #[test]
    fn tool_result_message_maps_to_tool_role() {
        let messages = vec![ModelMessage::tool_result("call_1", "\"sunny\"")];
        let body = provider().build_request_body(&messages, &CompletionOptions::default());
        assert_eq!(body["messages"][0]["role"], "tool");
        assert_eq!(body["messages"][0]["tool_call_id"], "call_1");
        assert_eq!(body["messages"][0]["content"], "\"sunny\"");
    }

    #[test]
    fn assistant_tool_calls_serialize_arguments_as_text() {
        let msg = ModelMessage {
            role: Role::Assistant,
            content: vec![ContentPart::ToolCall(ToolCall {
                id: "call_1".to_string(),
                name: "get_weather".to_string(),
                arguments: serde_json::json!({"city": "Paris"}),
            })],
            timestamp: None,
        };
        let body = provider().build_request_body(&[msg], &CompletionOptions::default());
        let tc = &body["messages"][0]["tool_calls"][0];
        assert_eq!(tc["function"]["name"], "get_weather");
        assert_eq!(tc["function"]["arguments"], r#"{"city":"Paris"}"#);
    }

    #[test]
    fn image_parts_become_data_urls() {
        let messages = vec![ModelMessage::user_with_image(
            "what is this?",
            "aGVsbG8=".to_string(),
            "image/png".to_string(),
        )];
        let body = provider().build_request_body(&messages, &CompletionOptions::default());
        let url = body["messages"][0]["content"][1]["image_url"]["url"]
            .as_str()
            .unwrap();
        assert_eq!(url, "data:image/png;base64,aGVsbG8=");
    }
}
