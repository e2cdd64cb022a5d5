//! Validation pipeline for a chatbot endpoint
//!
//! This module provides:
//! - The four checks (format, key data containment, latency, judged validity)
//! - An explicit dependency graph between them
//! - A sequential scheduler that skips checks whose prerequisites did not pass
//! - Reports with text and JSON renderings
//! - Stub providers for deterministic runs without network access
//!
//! # Example
//!
//! ```rust,no_run
//! use botcheck_core::config::BotcheckConfig;
//! use botcheck_core::eval::ValidationPipeline;
//!
//! # async fn run() -> botcheck_core::Result<()> {
//! let config = BotcheckConfig::load()?;
//! let report = ValidationPipeline::from_config(&config)?.run().await?;
//! println!("{}", report.render());
//! std::process::exit(report.exit_code());
//! # }
//! ```

pub mod checks;
pub mod graph;
pub mod pipeline;
pub mod report;
pub mod stub;

pub use checks::{
    ANSWER_VALIDITY, AnswerValidity, Check, CheckContext, CheckMetrics, CheckVerdict,
    KEY_DATA_CONTAINMENT, KeyDataContainment, RESPONSE_FORMAT, RESPONSE_TIME, ResponseFormat,
    ResponseTime, default_checks,
};
pub use graph::{CheckGraph, CheckNode};
pub use pipeline::{RunOptions, ValidationPipeline, ValidationPipelineBuilder};
pub use report::{CheckOutcome, CheckResult, ReportSummary, SuiteReport};
pub use stub::{StubProvider, StubResponse};
