//! RAG chatbot endpoint provider
//!
//! The endpoint takes the conversation as a bare JSON array of
//! `{"role", "content"}` objects and answers with `{"answer": "..."}`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{BotcheckError, Result};
use crate::llm::{ChatProvider, ChatRequest, ChatResponse, ModelInfo};

use super::{build_http_client, transport_error};

/// Provider for a retrieval-augmented chatbot HTTP endpoint.
pub struct RagProvider {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct RagAnswer {
    answer: Option<String>,
}

impl RagProvider {
    /// Create a provider posting to `url` with a 60 second transport cap.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(60))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatProvider for RagProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request.messages)
            .send()
            .await
            .map_err(|e| transport_error("RAG endpoint", e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BotcheckError::BotUnavailable(format!(
                "RAG endpoint error ({}): {}",
                status, text
            )));
        }

        let body: RagAnswer = response.json().await.map_err(|e| {
            BotcheckError::BotUnavailable(format!("invalid response format - {}", e))
        })?;

        let content = body.answer.ok_or_else(|| {
            BotcheckError::BotUnavailable("invalid response format - missing 'answer'".to_string())
        })?;

        Ok(ChatResponse { content })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "rag".to_string(),
            model_name: self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rag_provider_creation() {
        let provider = RagProvider::new("http://localhost:8000/api/rag/get_rag_answer").unwrap();
        assert_eq!(provider.url(), "http://localhost:8000/api/rag/get_rag_answer");
        assert_eq!(provider.model_info().provider, "rag");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        // Port 9 (discard) is not expected to accept HTTP
        let provider =
            RagProvider::with_timeout("http://127.0.0.1:9/answer", Duration::from_secs(2)).unwrap();
        let err = provider.ask("Kto je dekan?").await.unwrap_err();
        assert!(err.is_transport());
    }
}
