use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request to a chat provider
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Messages in the conversation
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Create a single-turn request whose only content is `prompt`
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
        }
    }
}

/// Response from a chat provider
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated content, untrimmed
    pub content: String,
}

/// Transport seam for anything that answers a conversational turn.
///
/// The bot under test and the reference model are both reached through this
/// trait, so a validation run can swap either for a stub.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a request and return the raw response.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Send `prompt` as the sole user turn and return the answer text.
    async fn ask(&self, prompt: &str) -> Result<String> {
        let response = self.complete(&ChatRequest::from_prompt(prompt)).await?;
        Ok(response.content)
    }

    /// Get model information
    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "unknown".to_string(),
            model_name: "unknown".to_string(),
        }
    }
}

#[async_trait]
impl<P: ChatProvider + ?Sized> ChatProvider for std::sync::Arc<P> {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        (**self).complete(request).await
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        (**self).ask(prompt).await
    }

    fn model_info(&self) -> ModelInfo {
        (**self).model_info()
    }
}

/// Model information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub provider: String,
    pub model_name: String,
}

impl std::fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model_name)
    }
}

pub mod factory;
pub mod providers;
pub mod retry;

pub use factory::ProviderFactory;
pub use retry::{RetryConfig, RetryingProvider, with_retry};

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl ChatProvider for EchoProvider {
        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse {
                content: format!(" {} ", request.messages[0].content),
            })
        }
    }

    #[test]
    fn test_request_from_prompt_is_single_user_turn() {
        let request = ChatRequest::from_prompt("Kto je dekan?");
        assert_eq!(request.messages, vec![Message::user("Kto je dekan?")]);
    }

    #[tokio::test]
    async fn test_default_ask_returns_content() {
        let answer = EchoProvider.ask("hello").await.unwrap();
        assert_eq!(answer, " hello ");
        assert_eq!(EchoProvider.model_info().to_string(), "unknown/unknown");
    }
}
