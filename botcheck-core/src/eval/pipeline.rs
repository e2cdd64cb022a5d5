//! Scheduler that runs checks in dependency order

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::checks::{Check, CheckContext, default_checks};
use super::graph::{CheckGraph, CheckNode};
use super::report::{CheckOutcome, CheckResult, SuiteReport};
use crate::client::{BotClient, ReferenceClient};
use crate::config::{BotcheckConfig, SuiteConfig};
use crate::error::{BotcheckError, Result};
use crate::llm::{ChatProvider, ProviderFactory};

/// Which checks a run should execute
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Check names to run; empty means all
    pub only: Vec<String>,

    /// Also run the transitive prerequisites of the selected checks
    pub with_prerequisites: bool,
}

impl RunOptions {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: names.into_iter().map(Into::into).collect(),
            with_prerequisites: false,
        }
    }

    pub fn with_prerequisites(mut self, enable: bool) -> Self {
        self.with_prerequisites = enable;
        self
    }
}

/// Runs a DAG of checks against a bot and a reference model.
///
/// Checks execute one at a time in topological order. A check whose
/// prerequisite did not pass (failed, errored, skipped, or not selected) is
/// recorded as skipped and never executed.
pub struct ValidationPipeline {
    context: CheckContext,
    graph: CheckGraph,
    checks: HashMap<String, Box<dyn Check>>,
}

impl ValidationPipeline {
    pub fn builder() -> ValidationPipelineBuilder {
        ValidationPipelineBuilder::new()
    }

    /// Build clients from configuration and register the standard checks
    pub fn from_config(config: &BotcheckConfig) -> Result<Self> {
        config.validate()?;
        let bot = ProviderFactory::create_with_retry(&config.bot, &config.retry)?;
        let reference = ProviderFactory::create_with_retry(&config.reference, &config.retry)?;

        Self::builder()
            .bot(bot)
            .reference(reference)
            .suite(config.suite.clone())
            .with_default_checks()
            .build()
    }

    pub fn graph(&self) -> &CheckGraph {
        &self.graph
    }

    pub fn context(&self) -> &CheckContext {
        &self.context
    }

    /// Run every check
    pub async fn run(&self) -> Result<SuiteReport> {
        self.run_with(&RunOptions::all()).await
    }

    /// Run the checks selected by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`BotcheckError::Graph`] when `options` names an unknown check.
    /// Check failures are reported in the [`SuiteReport`], not as errors.
    pub async fn run_with(&self, options: &RunOptions) -> Result<SuiteReport> {
        let selected = self.select(options)?;
        let started = tokio::time::Instant::now();

        tracing::info!(
            bot = %self.context.bot.model_info(),
            reference = %self.context.reference.model_info(),
            checks = selected.len(),
            "starting validation run"
        );

        let mut outcomes: HashMap<&str, CheckOutcome> = HashMap::new();
        let mut results = Vec::with_capacity(selected.len());

        for node in self.graph.ordered() {
            if !selected.contains(node.name.as_str()) {
                continue;
            }
            let Some(check) = self.checks.get(&node.name) else {
                continue;
            };

            let result = match Self::blocked_by(node, &outcomes) {
                Some((blocked_by, reason)) => {
                    tracing::warn!(check = %node.name, %reason, "skipping check");
                    CheckResult {
                        name: node.name.clone(),
                        depends_on: node.depends_on.clone(),
                        outcome: CheckOutcome::Skipped { blocked_by, reason },
                        duration: std::time::Duration::ZERO,
                        metrics: None,
                    }
                }
                None => self.execute(node, check.as_ref()).await,
            };

            outcomes.insert(node.name.as_str(), result.outcome.clone());
            results.push(result);
        }

        let report = SuiteReport::new(
            self.context.bot.model_info().to_string(),
            self.context.reference.model_info().to_string(),
            results,
            started.elapsed(),
        );

        tracing::info!(
            passed = report.summary.passed,
            failed = report.summary.failed,
            errored = report.summary.errored,
            skipped = report.summary.skipped,
            "validation run finished"
        );

        Ok(report)
    }

    fn select(&self, options: &RunOptions) -> Result<HashSet<&str>> {
        if options.only.is_empty() {
            return Ok(self.graph.ordered().map(|n| n.name.as_str()).collect());
        }

        let mut selected = HashSet::new();
        for name in &options.only {
            let node = self.graph.get(name).ok_or_else(|| {
                BotcheckError::Graph(format!("unknown check '{}'", name))
            })?;
            selected.insert(node.name.as_str());
            if options.with_prerequisites {
                selected.extend(self.graph.ancestors(name));
            }
        }
        Ok(selected)
    }

    /// Prerequisites that did not pass, with a reason for the skip
    fn blocked_by(
        node: &CheckNode,
        outcomes: &HashMap<&str, CheckOutcome>,
    ) -> Option<(Vec<String>, String)> {
        let mut blocked = Vec::new();
        let mut reasons = Vec::new();

        for dep in &node.depends_on {
            let state = match outcomes.get(dep.as_str()) {
                Some(CheckOutcome::Passed) => continue,
                Some(CheckOutcome::Failed { .. }) => "failed",
                Some(CheckOutcome::Errored { .. }) => "errored",
                Some(CheckOutcome::Skipped { .. }) => "was skipped",
                None => "was not selected",
            };
            reasons.push(format!("prerequisite '{}' {}", dep, state));
            blocked.push(dep.clone());
        }

        if blocked.is_empty() {
            None
        } else {
            Some((blocked, reasons.join("; ")))
        }
    }

    async fn execute(&self, node: &CheckNode, check: &dyn Check) -> CheckResult {
        tracing::info!(check = %node.name, description = check.description(), "running check");
        let start = tokio::time::Instant::now();
        let result = check.run(&self.context).await;
        let duration = start.elapsed();

        let (outcome, metrics) = match result {
            Ok(verdict) => {
                let outcome = match verdict.failure {
                    None => CheckOutcome::Passed,
                    Some(reason) => CheckOutcome::Failed { reason },
                };
                (outcome, verdict.metrics)
            }
            Err(e) => (CheckOutcome::Errored { error: e.to_string() }, None),
        };

        match &outcome {
            CheckOutcome::Passed => tracing::info!(check = %node.name, ?duration, "check passed"),
            CheckOutcome::Failed { reason } => {
                tracing::warn!(check = %node.name, %reason, "check failed")
            }
            CheckOutcome::Errored { error } => {
                tracing::warn!(check = %node.name, %error, "check errored")
            }
            CheckOutcome::Skipped { .. } => {}
        }

        CheckResult {
            name: node.name.clone(),
            depends_on: node.depends_on.clone(),
            outcome,
            duration,
            metrics,
        }
    }
}

/// Builder for [`ValidationPipeline`]
pub struct ValidationPipelineBuilder {
    bot: Option<Arc<dyn ChatProvider>>,
    reference: Option<Arc<dyn ChatProvider>>,
    suite: SuiteConfig,
    checks: Vec<Box<dyn Check>>,
}

impl ValidationPipelineBuilder {
    pub fn new() -> Self {
        Self {
            bot: None,
            reference: None,
            suite: SuiteConfig::default(),
            checks: Vec::new(),
        }
    }

    /// Set the provider for the bot under test
    pub fn bot(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.bot = Some(provider);
        self
    }

    /// Set the provider for the reference model and judge
    pub fn reference(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.reference = Some(provider);
        self
    }

    pub fn suite(mut self, suite: SuiteConfig) -> Self {
        self.suite = suite;
        self
    }

    /// Register a check; declaration order breaks ties in the run order
    pub fn check(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Register the four standard checks
    pub fn with_default_checks(mut self) -> Self {
        self.checks.extend(default_checks());
        self
    }

    /// # Errors
    ///
    /// [`BotcheckError::Configuration`] when a client is missing, and
    /// [`BotcheckError::Graph`] when the checks do not form a DAG.
    pub fn build(self) -> Result<ValidationPipeline> {
        let bot = self
            .bot
            .ok_or_else(|| BotcheckError::Configuration("bot provider not set".to_string()))?;
        let reference = self.reference.ok_or_else(|| {
            BotcheckError::Configuration("reference provider not set".to_string())
        })?;

        let nodes = self
            .checks
            .iter()
            .map(|c| CheckNode {
                name: c.name().to_string(),
                depends_on: c.depends_on(),
            })
            .collect();
        let graph = CheckGraph::new(nodes)?;

        let checks = self
            .checks
            .into_iter()
            .map(|c| (c.name().to_string(), c))
            .collect();

        Ok(ValidationPipeline {
            context: CheckContext {
                bot: BotClient::new(bot),
                reference: ReferenceClient::new(reference),
                suite: self.suite,
            },
            graph,
            checks,
        })
    }
}

impl Default for ValidationPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
