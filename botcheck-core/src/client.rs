//! Clients for the bot under test and the reference model

use std::sync::Arc;

use crate::error::{BotcheckError, Result};
use crate::judge::{JudgeVerdict, judge_prompt};
use crate::llm::{ChatProvider, ModelInfo};

/// Normalize provider failures: anything that is not already a transport
/// error is reported as the bot being unavailable.
fn unavailable(err: BotcheckError) -> BotcheckError {
    if err.is_transport() {
        err
    } else {
        BotcheckError::BotUnavailable(err.to_string())
    }
}

/// Client for the system under test
#[derive(Clone)]
pub struct BotClient {
    provider: Arc<dyn ChatProvider>,
}

impl BotClient {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Ask a single question and return the trimmed answer.
    ///
    /// Never retries; a failure is returned as [`BotcheckError::BotUnavailable`]
    /// or [`BotcheckError::Timeout`].
    pub async fn ask(&self, question: &str) -> Result<String> {
        let answer = self.provider.ask(question).await.map_err(unavailable)?;
        Ok(answer.trim().to_string())
    }

    pub fn model_info(&self) -> ModelInfo {
        self.provider.model_info()
    }
}

/// Client for the trusted reference model, also used as judge
#[derive(Clone)]
pub struct ReferenceClient {
    provider: Arc<dyn ChatProvider>,
}

impl ReferenceClient {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Ask the reference model directly; same contract as [`BotClient::ask`]
    pub async fn ask(&self, prompt: &str) -> Result<String> {
        let answer = self.provider.ask(prompt).await.map_err(unavailable)?;
        Ok(answer.trim().to_string())
    }

    /// Grade a bot answer against the expected answer
    pub async fn judge(&self, question: &str, expected: &str, answer: &str) -> Result<JudgeVerdict> {
        let reply = self.ask(&judge_prompt(question, expected, answer)).await?;
        let verdict = JudgeVerdict::parse(&reply);
        tracing::debug!(question, reply = %reply, ?verdict, "judge replied");
        Ok(verdict)
    }

    pub fn model_info(&self) -> ModelInfo {
        self.provider.model_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::stub::{StubProvider, StubResponse};

    #[tokio::test]
    async fn test_bot_answer_is_trimmed() {
        let bot = BotClient::new(Arc::new(StubProvider::new(StubResponse::answer(
            "  Igor Fabo\n",
        ))));
        assert_eq!(bot.ask("Kto je dekan?").await.unwrap(), "Igor Fabo");
    }

    #[tokio::test]
    async fn test_bot_failure_is_unavailable_not_a_string() {
        let bot = BotClient::new(Arc::new(StubProvider::new(StubResponse::unavailable(
            "connection refused",
        ))));
        let err = bot.ask("Kto je dekan?").await.unwrap_err();
        assert!(matches!(err, BotcheckError::BotUnavailable(_)));
    }

    #[tokio::test]
    async fn test_other_provider_errors_become_unavailable() {
        let bot = BotClient::new(Arc::new(StubProvider::new(StubResponse::rejected(
            "401 invalid api key",
        ))));
        let err = bot.ask("q").await.unwrap_err();
        assert!(matches!(err, BotcheckError::BotUnavailable(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn test_judge_sends_prompt_and_parses_verdict() {
        let stub = Arc::new(StubProvider::new(StubResponse::answer("YES")));
        let reference = ReferenceClient::new(stub.clone());

        let verdict = reference
            .judge("Kto je dekan?", "Igor Fabo", "Igor Fabo")
            .await
            .unwrap();

        assert!(verdict.is_yes());
        let history = stub.call_history().await;
        assert_eq!(history.len(), 1);
        assert!(history[0].contains("correct answer 'Igor Fabo'"));
    }
}
