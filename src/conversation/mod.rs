//! Conversation transcript and state management.

use std::collections::BTreeMap;

use crate::types::ModelMessage;

/// An ordered message transcript plus a key/value state side-channel.
///
/// The transcript is append-only: the engine only pushes new turns, never
/// removes or reorders existing entries. The state map is serialized into
/// the system prompt on every request, so updates between sends are visible
/// to the model. A conversation is exclusively owned by its caller; the
/// `&mut` requirement on sends serializes access per conversation.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    prompt: String,
    state: BTreeMap<String, serde_json::Value>,
    messages: Vec<ModelMessage>,
}

impl Conversation {
    /// Start a conversation from a system prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            state: BTreeMap::new(),
            messages: Vec::new(),
        }
    }

    /// The base system prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Set a state entry, visible to the model from the next request on.
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.state.insert(key.into(), value.into());
    }

    /// Remove a state entry.
    pub fn remove_state(&mut self, key: &str) -> Option<serde_json::Value> {
        self.state.remove(key)
    }

    /// The current state map.
    pub fn state(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.state
    }

    /// Append a message to the transcript.
    pub fn add_message(&mut self, message: ModelMessage) {
        self.messages.push(message);
    }

    /// All transcript messages, in conversational order.
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Number of transcript messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Synthesize the system message text: prompt plus serialized state.
    pub fn system_text(&self) -> String {
        if self.state.is_empty() {
            return self.prompt.clone();
        }
        let state = serde_json::to_string(&self.state).unwrap_or_default();
        format!("{}\n\nConversation state:\n{state}", self.prompt)
    }

    /// Build the outgoing message list: a freshly synthesized system
    /// message prepended to the transcript. The system message itself is
    /// never stored in the transcript.
    pub fn request_messages(&self) -> Vec<ModelMessage> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        out.push(ModelMessage::system(self.system_text()));
        out.extend(self.messages.iter().cloned());
        out
    }
}
