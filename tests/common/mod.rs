//! Shared test helpers and mock provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use parlance::error::ParlanceError;
use parlance::provider::ChatProvider;
use parlance::types::*;

/// A captured request: the outgoing message list and options.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub messages: Vec<ModelMessage>,
    pub options: CompletionOptions,
}

/// A mock provider returning queued responses and capturing requests.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<Vec<CompletionResult>>,
    requests: Mutex<Vec<CapturedRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a final text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push(CompletionResult {
            content: text.to_string(),
            tool_calls: vec![],
            finish_reason: FinishReason::Stop,
        });
    }

    /// Queue a tool-call turn.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.queue_tool_calls(&[(id, name, args)]);
    }

    /// Queue a turn with several tool calls.
    pub fn queue_tool_calls(&self, calls: &[(&str, &str, serde_json::Value)]) {
        self.responses.lock().unwrap().push(CompletionResult {
            content: String::new(),
            tool_calls: calls
                .iter()
                .map(|(id, name, args)| ToolCall {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                    arguments: args.clone(),
                })
                .collect(),
            finish_reason: FinishReason::ToolCalls,
        });
    }

    /// Queue a turn with an arbitrary finish reason.
    pub fn queue_finish(&self, finish_reason: FinishReason) {
        self.responses.lock().unwrap().push(CompletionResult {
            content: String::new(),
            tool_calls: vec![],
            finish_reason,
        });
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete_chat(
        &self,
        messages: &[ModelMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResult, ParlanceError> {
        self.requests.lock().unwrap().push(CapturedRequest {
            messages: messages.to_vec(),
            options: options.clone(),
        });
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(CompletionResult {
                content: "Mock response".to_string(),
                tool_calls: vec![],
                finish_reason: FinishReason::Stop,
            });
        }
        Ok(responses.remove(0))
    }
}

/// Wrapper so a test can hand a `Client` ownership of the provider while
/// keeping a handle for inspecting captured requests.
pub struct SharedProvider(pub Arc<MockProvider>);

#[async_trait]
impl ChatProvider for SharedProvider {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn model_id(&self) -> &str {
        self.0.model_id()
    }

    async fn complete_chat(
        &self,
        messages: &[ModelMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResult, ParlanceError> {
        self.0.complete_chat(messages, options).await
    }
}
