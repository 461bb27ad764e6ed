//! Orchestration loop: drives request / tool-execution cycles to completion.

pub mod trace;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::conversation::Conversation;
use crate::error::{ParlanceError, Result};
use crate::provider::ChatProvider;
use crate::tools::{Tool, ToolArguments};
use crate::types::*;

pub use trace::{MemorySink, TraceSink};

/// Default bound on request/tool cycles within one send.
///
/// The loop is otherwise unbounded against an adversarial model; the bound
/// is configurable through [`EngineOptions::max_turns`].
pub const DEFAULT_MAX_TURNS: usize = 20;

/// Options for one engine invocation.
#[derive(Clone)]
pub struct EngineOptions {
    /// Bound on request/tool cycles; `None` removes the bound.
    pub max_turns: Option<usize>,
    /// Optional diagnostic sink, invoked best-effort per event.
    pub trace: Option<Arc<dyn TraceSink>>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_turns: Some(DEFAULT_MAX_TURNS),
            trace: None,
        }
    }
}

impl EngineOptions {
    fn emit(&self, event: &str) {
        if let Some(ref sink) = self.trace {
            trace::trace_line(sink.as_ref(), event);
        }
    }
}

impl std::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("max_turns", &self.max_turns)
            .field("trace", &self.trace.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Drive the conversation until the provider returns a final answer.
///
/// Each turn sends the synthesized system message plus the transcript. On
/// `ToolCalls` the assistant message is appended, every named tool is
/// resolved by exact name — a miss is fatal before anything executes —
/// then the tools run sequentially in call order, each result appended as
/// a tool-role message, and the loop repeats. On `Stop` the assistant
/// message is appended and its content returned. Any other finish reason
/// is a protocol error.
pub async fn run_loop(
    provider: &dyn ChatProvider,
    conversation: &mut Conversation,
    tools: &[Box<dyn Tool>],
    response_format: Option<ResponseFormat>,
    options: &EngineOptions,
) -> Result<String> {
    let completion_options = CompletionOptions {
        response_format,
        tools: tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().to_value(),
            })
            .collect(),
    };

    let mut turn = 0usize;
    loop {
        if let Some(max) = options.max_turns {
            if turn >= max {
                return Err(ParlanceError::TurnLimit(max));
            }
        }
        turn += 1;

        let messages = conversation.request_messages();
        debug!(turn, provider = provider.name(), "engine: requesting completion");
        options.emit(&format!(
            "request provider={} model={} messages={}",
            provider.name(),
            provider.model_id(),
            messages.len()
        ));

        let result = provider.complete_chat(&messages, &completion_options).await?;
        options.emit(&format!(
            "response finish_reason={} tool_calls={}",
            result.finish_reason,
            result.tool_calls.len()
        ));

        match result.finish_reason {
            FinishReason::Stop => {
                conversation.add_message(ModelMessage::assistant(result.content.clone()));
                return Ok(result.content);
            }
            FinishReason::ToolCalls => {
                execute_tool_turn(conversation, tools, &result, options).await?;
            }
            other => {
                return Err(ParlanceError::protocol(format!(
                    "Conversation ended with finish reason `{other}`"
                )));
            }
        }
    }
}

/// Append the assistant turn and run its tool calls in order.
async fn execute_tool_turn(
    conversation: &mut Conversation,
    tools: &[Box<dyn Tool>],
    result: &CompletionResult,
    options: &EngineOptions,
) -> Result<()> {
    let mut assistant_content: Vec<ContentPart> = Vec::new();
    if !result.content.is_empty() {
        assistant_content.push(ContentPart::Text {
            text: result.content.clone(),
        });
    }
    for tc in &result.tool_calls {
        assistant_content.push(ContentPart::ToolCall(tc.clone()));
    }
    conversation.add_message(ModelMessage {
        role: Role::Assistant,
        content: assistant_content,
        timestamp: Some(chrono::Utc::now()),
    });

    // Resolve every name before executing anything: an unknown tool is a
    // provider/orchestration mismatch and must not be silently ignored,
    // and the transcript stays frozen after the assistant entry.
    let mut resolved = Vec::with_capacity(result.tool_calls.len());
    for tc in &result.tool_calls {
        let tool = tools
            .iter()
            .find(|t| t.name() == tc.name)
            .ok_or_else(|| ParlanceError::ToolNotFound(tc.name.clone()))?;
        resolved.push((tc, tool));
    }

    // Sequential, in the vendor's call order: later results may be
    // order-sensitive context for the model.
    for (tc, tool) in resolved {
        debug!(tool = %tc.name, id = %tc.id, "engine: executing tool");
        options.emit(&format!("tool name={} id={}", tc.name, tc.id));

        let args = ToolArguments::new(tc.arguments.clone());
        let value = tool
            .execute(&args)
            .await
            .map_err(|e| ParlanceError::ToolExecution {
                tool_name: tc.name.clone(),
                message: e.to_string(),
            })?;
        let content = match value {
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        conversation.add_message(ModelMessage::tool_result(tc.id.clone(), content));
    }

    Ok(())
}

/// A target type directly coercible from the model's textual answer.
///
/// Covers the plain-text type and the primitive kinds whose content is
/// converted without a JSON parse (`"42"` becomes the integer 42).
pub trait ReplyTarget: Sized {
    fn from_reply(text: &str) -> Option<Self>;
}

impl ReplyTarget for String {
    fn from_reply(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

macro_rules! impl_reply_target_parse {
    ($($ty:ty),+) => {
        $(impl ReplyTarget for $ty {
            fn from_reply(text: &str) -> Option<Self> {
                text.trim().parse().ok()
            }
        })+
    };
}

impl_reply_target_parse!(i32, i64, u32, u64, f32, f64, bool);

/// Coerce a final answer for a primitive target, logging on failure.
pub(crate) fn coerce_reply<T: ReplyTarget>(content: &str) -> Option<T> {
    let value = T::from_reply(content);
    if value.is_none() {
        warn!(content, "engine: reply coercion failed");
    }
    value
}

/// Parse a final answer as the JSON payload of a structured target.
pub(crate) fn parse_structured<T: serde::de::DeserializeOwned>(content: &str) -> Option<T> {
    let json_text = strip_code_fences(content);
    match serde_json::from_str(&json_text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "engine: structured reply parse failed");
            None
        }
    }
}

/// Strip markdown code fences from a JSON response.
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        let without_opening = if let Some(rest) = trimmed.strip_prefix("```json") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("```") {
            rest
        } else {
            trimmed
        };
        if let Some(stripped) = without_opening.strip_suffix("```") {
            return stripped.trim().to_string();
        }
        return without_opening.trim().to_string();
    }
    trimmed.to_string()
}
