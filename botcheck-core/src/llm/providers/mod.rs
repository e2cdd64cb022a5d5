//! Chat provider implementations

pub mod openai;
pub mod rag;

pub use openai::OpenAIProvider;
pub use rag::RagProvider;

use crate::error::{BotcheckError, Result};
use std::time::Duration;

/// Map a reqwest failure onto the transport error variants.
pub(crate) fn transport_error(target: &str, err: reqwest::Error, timeout: Duration) -> BotcheckError {
    if err.is_timeout() {
        BotcheckError::Timeout(timeout)
    } else {
        BotcheckError::BotUnavailable(format!("Failed to send request to {}: {}", target, err))
    }
}

/// Build an HTTP client enforcing `timeout` on every request.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(client_error)
}

fn client_error(err: reqwest::Error) -> BotcheckError {
    BotcheckError::Configuration(format!("Failed to build HTTP client: {}", err))
}
