//! Configuration: API keys and base URLs, layered code > env.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<ParlanceConfig> = OnceLock::new();

/// Per-provider credentials and endpoints.
#[derive(Debug, Clone, Default)]
pub struct ParlanceConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
}

impl ParlanceConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables (OPENAI_API_KEY, ANTHROPIC_API_KEY,
    /// OPENAI_BASE_URL, ANTHROPIC_BASE_URL). A `.env` file is honored.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let config = Self::new();

        let key_mappings = [
            ("OPENAI_API_KEY", "openai"),
            ("ANTHROPIC_API_KEY", "anthropic"),
        ];
        for (env_var, provider) in &key_mappings {
            if let Ok(key) = std::env::var(env_var) {
                config.set_api_key(provider, key);
            }
        }

        let url_mappings = [
            ("OPENAI_BASE_URL", "openai"),
            ("ANTHROPIC_BASE_URL", "anthropic"),
        ];
        for (env_var, provider) in &url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(provider, url);
            }
        }

        config
    }

    /// Access the process-wide default config, loading from env on first use.
    pub fn global() -> &'static ParlanceConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        self.api_keys
            .write()
            .expect("config lock poisoned")
            .insert(provider.to_string(), key);
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys
            .read()
            .expect("config lock poisoned")
            .get(provider)
            .cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        self.base_urls
            .write()
            .expect("config lock poisoned")
            .insert(provider.to_string(), url);
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls
            .read()
            .expect("config lock poisoned")
            .get(provider)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_keys_are_returned() {
        let config = ParlanceConfig::new();
        config.set_api_key("openai", "sk-test".to_string());
        assert_eq!(config.get_api_key("openai").as_deref(), Some("sk-test"));
        assert_eq!(config.get_api_key("anthropic"), None);
    }

    #[test]
    fn base_urls_are_per_provider() {
        let config = ParlanceConfig::new();
        config.set_base_url("anthropic", "https://example.test/v1".to_string());
        assert_eq!(
            config.get_base_url("anthropic").as_deref(),
            Some("https://example.test/v1")
        );
        assert_eq!(config.get_base_url("openai"), None);
    }
}
