//! Caller surface: provider selection, conversations, and typed sends.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use tracing::warn;

use crate::config::ParlanceConfig;
use crate::conversation::Conversation;
use crate::engine::{self, EngineOptions, ReplyTarget};
use crate::error::Result;
use crate::provider::{create_provider, ChatProvider, ModelSpec};
use crate::schema::StructuredOutput;
use crate::tools::Tool;
use crate::types::{ModelMessage, ResponseFormat};

/// A client bound to one provider adapter.
///
/// Every send drives the orchestration loop to completion and coerces the
/// final answer into the caller's target type. All failures — transport,
/// unknown tool, coercion — are logged and surface uniformly as `None`.
pub struct Client {
    provider: Box<dyn ChatProvider>,
    options: EngineOptions,
}

impl Client {
    /// Select a provider and model from a "provider:model-id" reference,
    /// using the process-wide config.
    pub fn for_model(reference: &str) -> Result<Self> {
        Self::for_model_with_config(reference, ParlanceConfig::global())
    }

    /// Select a provider and model with an explicit config.
    pub fn for_model_with_config(reference: &str, config: &ParlanceConfig) -> Result<Self> {
        let spec: ModelSpec = reference.parse()?;
        Ok(Self::from_provider(create_provider(&spec, config)?))
    }

    /// Wrap an existing adapter.
    pub fn from_provider(provider: Box<dyn ChatProvider>) -> Self {
        Self {
            provider,
            options: EngineOptions::default(),
        }
    }

    /// Replace the engine options.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying adapter.
    pub fn provider(&self) -> &dyn ChatProvider {
        self.provider.as_ref()
    }

    /// Start a conversation from a system prompt.
    pub fn start_conversation(&self, system_prompt: impl Into<String>) -> Conversation {
        Conversation::new(system_prompt)
    }

    /// Send an input and coerce the final answer to a text or primitive
    /// target. Returns `None` on any failure.
    pub async fn send<T: ReplyTarget>(
        &self,
        conversation: &mut Conversation,
        input: impl Serialize,
        tools: &[Box<dyn Tool>],
    ) -> Option<T> {
        self.send_inner(conversation, input, None, tools).await
    }

    /// Like [`Client::send`], attaching a raw image payload to the user turn.
    pub async fn send_with_image<T: ReplyTarget>(
        &self,
        conversation: &mut Conversation,
        input: impl Serialize,
        image: &[u8],
        mime_type: &str,
        tools: &[Box<dyn Tool>],
    ) -> Option<T> {
        self.send_inner(conversation, input, Some((image, mime_type)), tools)
            .await
    }

    /// Send an input and parse the final answer into a structured target
    /// via its generated JSON schema. Returns `None` on any failure.
    pub async fn send_structured<T: StructuredOutput>(
        &self,
        conversation: &mut Conversation,
        input: impl Serialize,
        tools: &[Box<dyn Tool>],
    ) -> Option<T> {
        self.send_structured_inner(conversation, input, None, tools)
            .await
    }

    /// Like [`Client::send_structured`], attaching a raw image payload.
    pub async fn send_structured_with_image<T: StructuredOutput>(
        &self,
        conversation: &mut Conversation,
        input: impl Serialize,
        image: &[u8],
        mime_type: &str,
        tools: &[Box<dyn Tool>],
    ) -> Option<T> {
        self.send_structured_inner(conversation, input, Some((image, mime_type)), tools)
            .await
    }

    async fn send_inner<T: ReplyTarget>(
        &self,
        conversation: &mut Conversation,
        input: impl Serialize,
        image: Option<(&[u8], &str)>,
        tools: &[Box<dyn Tool>],
    ) -> Option<T> {
        push_user_message(conversation, input, image)?;
        let content =
            match engine::run_loop(self.provider.as_ref(), conversation, tools, None, &self.options)
                .await
            {
                Ok(content) => content,
                Err(e) => {
                    warn!(error = %e, "send failed");
                    return None;
                }
            };
        engine::coerce_reply(&content)
    }

    async fn send_structured_inner<T: StructuredOutput>(
        &self,
        conversation: &mut Conversation,
        input: impl Serialize,
        image: Option<(&[u8], &str)>,
        tools: &[Box<dyn Tool>],
    ) -> Option<T> {
        push_user_message(conversation, input, image)?;
        // Schema descriptors are transient: rebuilt for every send.
        let format = ResponseFormat::JsonSchema {
            name: T::NAME.to_string(),
            description: T::description(),
            schema: T::response_schema().to_value(),
        };
        let content = match engine::run_loop(
            self.provider.as_ref(),
            conversation,
            tools,
            Some(format),
            &self.options,
        )
        .await
        {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "send_structured failed");
                return None;
            }
        };
        engine::parse_structured(&content)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model_id())
            .field("options", &self.options)
            .finish()
    }
}

/// Append the user turn: an arbitrary serializable input, optionally with
/// an image payload. Strings pass through verbatim; anything else becomes
/// JSON text.
fn push_user_message(
    conversation: &mut Conversation,
    input: impl Serialize,
    image: Option<(&[u8], &str)>,
) -> Option<()> {
    let text = match serde_json::to_value(input) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(e) => {
            warn!(error = %e, "input serialization failed");
            return None;
        }
    };
    let message = match image {
        Some((bytes, mime_type)) => {
            ModelMessage::user_with_image(text, BASE64.encode(bytes), mime_type.to_string())
        }
        None => ModelMessage::user(text),
    };
    conversation.add_message(message);
    Some(())
}
