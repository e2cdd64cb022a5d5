//! The four validation checks and the trait they share

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::client::{BotClient, ReferenceClient};
use crate::config::SuiteConfig;
use crate::error::{BotcheckError, Result};
use crate::questions::QuestionSet;

pub const RESPONSE_FORMAT: &str = "response_format";
pub const KEY_DATA_CONTAINMENT: &str = "key_data_containment";
pub const RESPONSE_TIME: &str = "response_time";
pub const ANSWER_VALIDITY: &str = "answer_validity";

/// Everything a check may use while running
#[derive(Clone)]
pub struct CheckContext {
    pub bot: BotClient,
    pub reference: ReferenceClient,
    pub suite: SuiteConfig,
}

impl CheckContext {
    /// Load the configured question set; reloaded on every call
    pub fn questions(&self) -> Result<QuestionSet> {
        QuestionSet::load(&self.suite.questions_path)
    }
}

/// Figures behind a pass/fail decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckMetrics {
    Count {
        matched: usize,
        total: usize,
        required: usize,
    },
    Latency {
        #[serde(with = "humantime_serde")]
        elapsed: Duration,
        #[serde(with = "humantime_serde")]
        limit: Duration,
    },
}

impl fmt::Display for CheckMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckMetrics::Count {
                matched,
                total,
                required,
            } => write!(f, "{}/{} (required {})", matched, total, required),
            CheckMetrics::Latency { elapsed, limit } => write!(
                f,
                "{:.2}s (limit {:.2}s)",
                elapsed.as_secs_f64(),
                limit.as_secs_f64()
            ),
        }
    }
}

/// Result of a check that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckVerdict {
    /// `None` when the check passed
    pub failure: Option<String>,
    pub metrics: Option<CheckMetrics>,
}

impl CheckVerdict {
    pub fn pass() -> Self {
        Self {
            failure: None,
            metrics: None,
        }
    }

    pub fn fail(reason: impl fmt::Display) -> Self {
        Self {
            failure: Some(reason.to_string()),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: CheckMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn is_pass(&self) -> bool {
        self.failure.is_none()
    }

    /// Pass when `matched` reaches `required`, otherwise fail with a threshold reason
    fn from_count(check: &str, matched: usize, total: usize, required: usize) -> Self {
        let verdict = if matched >= required {
            Self::pass()
        } else {
            Self::fail(BotcheckError::below_count(check, matched, total, required))
        };
        verdict.with_metrics(CheckMetrics::Count {
            matched,
            total,
            required,
        })
    }
}

/// A named validation step.
///
/// `run` returns `Ok` with a verdict when the check could be evaluated and
/// `Err` when it could not (bot unreachable, unreadable question file); the
/// scheduler records the latter as errored.
#[async_trait]
pub trait Check: Send + Sync {
    fn name(&self) -> &str;

    /// Names of checks that must pass before this one runs
    fn depends_on(&self) -> Vec<String> {
        Vec::new()
    }

    fn description(&self) -> &str {
        ""
    }

    async fn run(&self, ctx: &CheckContext) -> Result<CheckVerdict>;
}

/// The answer to the fixed question must not be an error message
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseFormat;

#[async_trait]
impl Check for ResponseFormat {
    fn name(&self) -> &str {
        RESPONSE_FORMAT
    }

    fn description(&self) -> &str {
        "bot answers the fixed question without an error"
    }

    async fn run(&self, ctx: &CheckContext) -> Result<CheckVerdict> {
        let answer = ctx.bot.ask(&ctx.suite.fixed_question).await?;
        if answer.to_lowercase().starts_with("error") {
            return Ok(CheckVerdict::fail(format!(
                "bot returned an error response: {}",
                answer
            )));
        }
        Ok(CheckVerdict::pass())
    }
}

/// Expected answers must appear verbatim (ignoring case) in the bot's answers
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyDataContainment;

#[async_trait]
impl Check for KeyDataContainment {
    fn name(&self) -> &str {
        KEY_DATA_CONTAINMENT
    }

    fn depends_on(&self) -> Vec<String> {
        vec![RESPONSE_FORMAT.to_string()]
    }

    fn description(&self) -> &str {
        "expected answers are contained in the bot's answers"
    }

    async fn run(&self, ctx: &CheckContext) -> Result<CheckVerdict> {
        let questions = ctx.questions()?;
        let mut matched = 0;

        for pair in &questions {
            let answer = ctx.bot.ask(&pair.question).await?;
            if pair.is_contained_in(&answer) {
                matched += 1;
                tracing::debug!(question = %pair.question, "expected answer found");
            } else {
                tracing::warn!(
                    question = %pair.question,
                    expected = %pair.expected_answer,
                    answer = %answer,
                    "expected answer missing"
                );
            }
        }

        let total = questions.len();
        let required = ctx.suite.pass_ratio.required(total);
        Ok(CheckVerdict::from_count(self.name(), matched, total, required))
    }
}

/// One answer to the fixed question must arrive within the latency limit
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseTime;

#[async_trait]
impl Check for ResponseTime {
    fn name(&self) -> &str {
        RESPONSE_TIME
    }

    fn depends_on(&self) -> Vec<String> {
        vec![RESPONSE_FORMAT.to_string()]
    }

    fn description(&self) -> &str {
        "bot answers within the latency limit"
    }

    async fn run(&self, ctx: &CheckContext) -> Result<CheckVerdict> {
        let limit = ctx.suite.max_response_time;
        let start = tokio::time::Instant::now();
        ctx.bot.ask(&ctx.suite.fixed_question).await?;
        let elapsed = start.elapsed();

        let verdict = if elapsed <= limit {
            CheckVerdict::pass()
        } else {
            CheckVerdict::fail(BotcheckError::too_slow(self.name(), elapsed, limit))
        };
        Ok(verdict.with_metrics(CheckMetrics::Latency { elapsed, limit }))
    }
}

/// The reference model must judge the bot's answers correct
#[derive(Debug, Default, Clone, Copy)]
pub struct AnswerValidity;

#[async_trait]
impl Check for AnswerValidity {
    fn name(&self) -> &str {
        ANSWER_VALIDITY
    }

    fn depends_on(&self) -> Vec<String> {
        vec![KEY_DATA_CONTAINMENT.to_string()]
    }

    fn description(&self) -> &str {
        "reference model judges the bot's answers correct"
    }

    async fn run(&self, ctx: &CheckContext) -> Result<CheckVerdict> {
        let questions = ctx.questions()?;
        let mut matched = 0;

        for pair in &questions {
            let answer = ctx.bot.ask(&pair.question).await?;
            let verdict = ctx
                .reference
                .judge(&pair.question, &pair.expected_answer, &answer)
                .await?;
            if verdict.is_yes() {
                matched += 1;
            } else {
                tracing::warn!(question = %pair.question, answer = %answer, "judge rejected answer");
            }
        }

        let total = questions.len();
        let required = ctx.suite.pass_ratio.required(total);
        Ok(CheckVerdict::from_count(self.name(), matched, total, required))
    }
}

/// The standard suite, in declaration order
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(ResponseFormat),
        Box::new(KeyDataContainment),
        Box::new(ResponseTime),
        Box::new(AnswerValidity),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_verdict() {
        assert!(CheckVerdict::from_count("c", 2, 3, 2).is_pass());

        let failed = CheckVerdict::from_count("c", 1, 3, 2);
        assert_eq!(failed.failure.as_deref(), Some("c: got 1/3, needed >= 2"));
        assert_eq!(
            failed.metrics,
            Some(CheckMetrics::Count {
                matched: 1,
                total: 3,
                required: 2
            })
        );
    }

    #[test]
    fn test_empty_set_passes_with_zero_required() {
        assert!(CheckVerdict::from_count("c", 0, 0, 0).is_pass());
    }

    #[test]
    fn test_default_checks_dependencies() {
        let checks = default_checks();
        let edges: Vec<(&str, Vec<String>)> =
            checks.iter().map(|c| (c.name(), c.depends_on())).collect();

        assert_eq!(
            edges,
            vec![
                (RESPONSE_FORMAT, vec![]),
                (KEY_DATA_CONTAINMENT, vec![RESPONSE_FORMAT.to_string()]),
                (RESPONSE_TIME, vec![RESPONSE_FORMAT.to_string()]),
                (ANSWER_VALIDITY, vec![KEY_DATA_CONTAINMENT.to_string()]),
            ]
        );
    }

    #[test]
    fn test_metrics_display() {
        let latency = CheckMetrics::Latency {
            elapsed: Duration::from_millis(1500),
            limit: Duration::from_secs(20),
        };
        assert_eq!(latency.to_string(), "1.50s (limit 20.00s)");
    }
}
