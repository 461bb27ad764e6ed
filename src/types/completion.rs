//! Completion request options and results.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::message::ToolCall;

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: serde_json::Value,
}

/// Requested response format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonSchema {
        name: String,
        description: String,
        schema: serde_json::Value,
    },
}

/// Options for a single completion call.
///
/// Built fresh per engine invocation; adapters read but never mutate it.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub response_format: Option<ResponseFormat>,
    pub tools: Vec<ToolDefinition>,
}

/// Why a completion turn ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    ToolCalls,
    MaxTokens,
    ContentFilter,
}

/// Provider-agnostic result of one completion turn.
///
/// `finish_reason` is the sole driver of loop branching: `Stop` makes
/// `content` actionable, `ToolCalls` makes `tool_calls` actionable, and
/// the remaining reasons terminate the conversation.
#[derive(Debug, Clone)]
pub struct CompletionResult {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
}
