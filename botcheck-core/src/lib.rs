//! # Botcheck - validation harness for chatbot endpoints
//!
//! Botcheck asks a bot fixed and file-driven questions and asserts that its
//! answers are:
//! - Well-formed (not an error message)
//! - Timely (under a latency limit)
//! - Correct, by substring containment of expected answers
//! - Correct, as judged by an independent reference model
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use botcheck_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = BotcheckConfig::load()?;
//!     let pipeline = ValidationPipeline::from_config(&config)?;
//!
//!     let report = pipeline.run().await?;
//!     println!("{}", report.render());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **llm**: the `ChatProvider` transport seam (OpenAI-compatible and RAG endpoints)
//! - **client**: `BotClient` and `ReferenceClient` on top of a provider
//! - **questions**: question/expected-answer sets loaded from JSON
//! - **eval**: checks, their dependency graph, the scheduler and reports

pub mod client;
pub mod config;
pub mod error;
pub mod eval;
pub mod judge;
pub mod llm;
pub mod questions;

pub use error::{BotcheckError, Result};

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{BotClient, ReferenceClient};
    pub use crate::config::{BotcheckConfig, PassRatio, ProviderConfig, ProviderKind, SuiteConfig};
    pub use crate::error::{BotcheckError, Result};
    pub use crate::eval::{
        Check, CheckContext, CheckOutcome, CheckVerdict, RunOptions, SuiteReport,
        ValidationPipeline,
    };
    pub use crate::judge::JudgeVerdict;
    pub use crate::llm::{ChatProvider, ProviderFactory};
    pub use crate::questions::{QuestionAnswerPair, QuestionSet};
}
