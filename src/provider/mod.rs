//! Provider adapter trait and implementations.

pub mod http;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "anthropic")]
pub mod anthropic;

use std::str::FromStr;

use async_trait::async_trait;

use crate::config::ParlanceConfig;
use crate::error::ParlanceError;
use crate::types::{CompletionOptions, CompletionResult, ModelMessage};

/// Core trait implemented by all provider adapters.
///
/// An adapter translates the provider-agnostic message list and options
/// into the vendor wire format, issues the HTTP call, and maps the vendor
/// response back — including normalizing tool-call and tool-result records
/// and the finish condition. Adapters are stateless beyond credentials and
/// model id, so one instance may serve concurrent conversations.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name (e.g., "openai", "anthropic").
    fn name(&self) -> &str;

    /// The model ID this adapter instance serves.
    fn model_id(&self) -> &str;

    /// Run one completion turn against the vendor API.
    async fn complete_chat(
        &self,
        messages: &[ModelMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResult, ParlanceError>;
}

/// Provider variant of a model reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

/// Parsed "provider:model-id" reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: ProviderKind,
    pub model_id: String,
}

impl FromStr for ModelSpec {
    type Err = ParlanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model_id) = s.split_once(':').ok_or_else(|| {
            ParlanceError::ModelNotFound(format!(
                "Expected 'provider:model-id', got '{s}'"
            ))
        })?;
        let provider = match provider {
            "openai" => ProviderKind::OpenAi,
            "anthropic" => ProviderKind::Anthropic,
            other => {
                return Err(ParlanceError::ModelNotFound(format!(
                    "Unknown provider '{other}'"
                )))
            }
        };
        if model_id.is_empty() {
            return Err(ParlanceError::ModelNotFound(format!("Empty model id in '{s}'")));
        }
        Ok(Self {
            provider,
            model_id: model_id.to_string(),
        })
    }
}

/// Create an adapter for the given model, using the provided config.
#[allow(unused_variables)]
pub fn create_provider(
    spec: &ModelSpec,
    config: &ParlanceConfig,
) -> Result<Box<dyn ChatProvider>, ParlanceError> {
    match spec.provider {
        #[cfg(feature = "openai")]
        ProviderKind::OpenAi => {
            let api_key = config
                .get_api_key("openai")
                .ok_or_else(|| ParlanceError::Authentication("Missing OPENAI_API_KEY".into()))?;
            Ok(Box::new(openai::OpenAiProvider::new(
                spec.model_id.clone(),
                api_key,
                config.get_base_url("openai"),
            )))
        }
        #[cfg(feature = "anthropic")]
        ProviderKind::Anthropic => {
            let api_key = config
                .get_api_key("anthropic")
                .ok_or_else(|| ParlanceError::Authentication("Missing ANTHROPIC_API_KEY".into()))?;
            Ok(Box::new(anthropic::AnthropicProvider::new(
                spec.model_id.clone(),
                api_key,
                config.get_base_url("anthropic"),
            )))
        }
        #[allow(unreachable_patterns)]
        _ => Err(ParlanceError::ModelNotFound(format!(
            "Provider for model '{}' not enabled via feature flags",
            spec.model_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_spec_parses_provider_and_id() {
        let spec: ModelSpec = "openai:gpt-4o".parse().unwrap();
        assert_eq!(spec.provider, ProviderKind::OpenAi);
        assert_eq!(spec.model_id, "gpt-4o");

        let spec: ModelSpec = "anthropic:claude-sonnet-4-20250514".parse().unwrap();
        assert_eq!(spec.provider, ProviderKind::Anthropic);
    }

    #[test]
    fn model_spec_rejects_malformed_references() {
        assert!("gpt-4o".parse::<ModelSpec>().is_err());
        assert!("mistral:small".parse::<ModelSpec>().is_err());
        assert!("openai:".parse::<ModelSpec>().is_err());
    }
}
