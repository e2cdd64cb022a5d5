//! Factory for creating chat providers from configuration

use std::sync::Arc;

use crate::config::{DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL, ProviderConfig, ProviderKind};
use crate::error::{BotcheckError, Result};
use crate::llm::ChatProvider;
use crate::llm::providers::{OpenAIProvider, RagProvider};
use crate::llm::retry::{RetryConfig, RetryingProvider};

/// Factory for creating chat providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete (e.g., a RAG
    /// provider without an endpoint URL) or the HTTP client cannot be built.
    pub fn create(config: &ProviderConfig) -> Result<Arc<dyn ChatProvider>> {
        match config.provider {
            ProviderKind::OpenAI => {
                let model = if config.model.is_empty() {
                    DEFAULT_MODEL.to_string()
                } else {
                    config.model.clone()
                };
                let base_url = config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

                let provider =
                    OpenAIProvider::with_base_url(config.resolved_api_key(), model, base_url)
                        .and_then(|p| p.with_timeout(config.timeout))?;
                Ok(Arc::new(provider))
            }
            ProviderKind::Rag => {
                let url = config.base_url.clone().ok_or_else(|| {
                    BotcheckError::Configuration(
                        "RAG provider requires base_url (the endpoint URL)".to_string(),
                    )
                })?;
                Ok(Arc::new(RagProvider::with_timeout(url, config.timeout)?))
            }
        }
    }

    /// Create a provider and wrap it in the retry layer when `retry` enables it
    pub fn create_with_retry(
        config: &ProviderConfig,
        retry: &RetryConfig,
    ) -> Result<Arc<dyn ChatProvider>> {
        let provider = Self::create(config)?;
        if !retry.is_enabled() {
            return Ok(provider);
        }
        Ok(Arc::new(RetryingProvider::new(provider, retry.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai() {
        let config = ProviderConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        let provider = ProviderFactory::create(&config).unwrap();
        let info = provider.model_info();
        assert_eq!(info.provider, "openai");
        assert_eq!(info.model_name, DEFAULT_MODEL);
    }

    #[test]
    fn test_create_rag_requires_url() {
        let config = ProviderConfig {
            provider: ProviderKind::Rag,
            ..Default::default()
        };
        assert!(ProviderFactory::create(&config).is_err());

        let config = ProviderConfig {
            provider: ProviderKind::Rag,
            base_url: Some("http://localhost:8000/answer".to_string()),
            ..Default::default()
        };
        let provider = ProviderFactory::create(&config).unwrap();
        assert_eq!(provider.model_info().provider, "rag");
    }

    #[test]
    fn test_retry_layer_keeps_model_info() {
        let config = ProviderConfig {
            api_key: Some("test-key".to_string()),
            model: "gpt-4o".to_string(),
            ..Default::default()
        };
        let retry = RetryConfig::default().with_max_attempts(3);
        let provider = ProviderFactory::create_with_retry(&config, &retry).unwrap();
        assert_eq!(provider.model_info().model_name, "gpt-4o");
    }
}
