//! Convenience re-exports for common use.

pub use crate::client::Client;
pub use crate::config::ParlanceConfig;
pub use crate::conversation::Conversation;
pub use crate::engine::{EngineOptions, ReplyTarget, TraceSink};
pub use crate::error::{ParlanceError, Result};
pub use crate::provider::{ChatProvider, ModelSpec};
pub use crate::schema::{ObjectBuilder, ParamSpec, SchemaNode, Schematic, StructuredOutput};
pub use crate::tools::{FunctionTool, Tool, ToolArguments};
pub use crate::types::{
    CompletionOptions, CompletionResult, ContentPart, FinishReason, ModelMessage, ResponseFormat,
    Role, ToolCall, ToolDefinition,
};
