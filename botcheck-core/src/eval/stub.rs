//! Stub chat providers for deterministic runs
//!
//! A [`StubProvider`] stands in for the bot or the reference model. It
//! answers from prompt-matched rules first, then from an ordered response
//! list (repeating the last entry), and can simulate latency and failures.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::{BotcheckError, Result};
use crate::llm::{ChatProvider, ChatRequest, ChatResponse, ModelInfo};

/// Simulated failure
#[derive(Debug, Clone)]
pub enum StubFailure {
    /// Transport failure
    Unavailable(String),
    /// Transport timeout
    Timeout(Duration),
    /// Provider-side rejection (bad key, malformed reply)
    Rejected(String),
}

impl StubFailure {
    fn to_error(&self) -> BotcheckError {
        match self {
            StubFailure::Unavailable(message) => BotcheckError::BotUnavailable(message.clone()),
            StubFailure::Timeout(after) => BotcheckError::Timeout(*after),
            StubFailure::Rejected(message) => BotcheckError::Other(message.clone()),
        }
    }
}

/// Predetermined response for a stub provider
#[derive(Debug, Clone)]
pub struct StubResponse {
    /// Answer text on success
    pub content: Option<String>,

    /// Failure to return instead
    pub failure: Option<StubFailure>,

    /// Simulated latency
    pub delay: Duration,
}

impl StubResponse {
    /// Create a successful response
    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            failure: None,
            delay: Duration::ZERO,
        }
    }

    /// Create a transport failure
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::failing(StubFailure::Unavailable(message.into()))
    }

    /// Create a transport timeout
    pub fn timeout(after: Duration) -> Self {
        Self::failing(StubFailure::Timeout(after))
    }

    /// Create a provider-side rejection
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::failing(StubFailure::Rejected(message.into()))
    }

    fn failing(failure: StubFailure) -> Self {
        Self {
            content: None,
            failure: Some(failure),
            delay: Duration::ZERO,
        }
    }

    /// Add a simulated delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Response returned whenever the prompt contains `needle`
#[derive(Debug, Clone)]
struct StubRule {
    needle: String,
    response: StubResponse,
}

/// A chat provider that returns predetermined responses
pub struct StubProvider {
    name: String,
    rules: Vec<StubRule>,
    responses: Vec<StubResponse>,
    call_count: AtomicUsize,
    sequence_index: AtomicUsize,
    call_history: Arc<RwLock<Vec<String>>>,
}

impl StubProvider {
    /// Create a stub that always returns `response`
    pub fn new(response: StubResponse) -> Self {
        Self::with_responses(vec![response])
    }

    /// Create a stub with multiple responses (returned in order, last one repeats)
    pub fn with_responses(responses: Vec<StubResponse>) -> Self {
        Self {
            name: "stub".to_string(),
            rules: Vec::new(),
            responses,
            call_count: AtomicUsize::new(0),
            sequence_index: AtomicUsize::new(0),
            call_history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a stub answering each question with its paired answer.
    ///
    /// Prompts that match no question get an empty answer.
    pub fn keyed<Q, A>(answers: impl IntoIterator<Item = (Q, A)>) -> Self
    where
        Q: Into<String>,
        A: Into<String>,
    {
        answers
            .into_iter()
            .fold(Self::with_responses(Vec::new()), |stub, (question, answer)| {
                stub.with_rule(question, StubResponse::answer(answer))
            })
    }

    /// Return `response` for any prompt containing `needle`; first match wins
    pub fn with_rule(mut self, needle: impl Into<String>, response: StubResponse) -> Self {
        self.rules.push(StubRule {
            needle: needle.into(),
            response,
        });
        self
    }

    /// Name reported through `model_info`
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the number of calls made
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the prompts received, in call order
    pub async fn call_history(&self) -> Vec<String> {
        self.call_history.read().await.clone()
    }

    /// Reset call count and history
    pub async fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        self.sequence_index.store(0, Ordering::SeqCst);
        self.call_history.write().await.clear();
    }

    fn pick(&self, prompt: &str) -> StubResponse {
        if let Some(rule) = self.rules.iter().find(|r| prompt.contains(&r.needle)) {
            return rule.response.clone();
        }

        let index = self.sequence_index.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(index).or(self.responses.last()) {
            Some(response) => response.clone(),
            None => StubResponse::answer(""),
        }
    }
}

#[async_trait]
impl ChatProvider for StubProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.call_history.write().await.push(prompt.clone());

        let response = self.pick(&prompt);

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        if let Some(ref failure) = response.failure {
            return Err(failure.to_error());
        }

        Ok(ChatResponse {
            content: response.content.unwrap_or_default(),
        })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "stub".to_string(),
            model_name: self.name.clone(),
        }
    }
}
