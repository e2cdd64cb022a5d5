//! Configuration types for botcheck

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{BotcheckError, Result};
use crate::llm::retry::RetryConfig;

/// Default OpenAI-compatible API base URL
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for both the bot and the reference model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Placeholder key used when `OPENAI_API_KEY` is absent
pub const PLACEHOLDER_API_KEY: &str = "your_api_key";

/// Main configuration for a validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotcheckConfig {
    /// Bot under test
    pub bot: ProviderConfig,

    /// Trusted reference model, also used as judge
    pub reference: ProviderConfig,

    /// Suite parameters
    pub suite: SuiteConfig,

    /// Optional retry policy layered over both clients (off by default)
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for BotcheckConfig {
    fn default() -> Self {
        Self {
            bot: ProviderConfig::default(),
            reference: ProviderConfig::default(),
            suite: SuiteConfig::default(),
            retry: RetryConfig::no_retry(),
        }
    }
}

/// Chat provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type
    pub provider: ProviderKind,

    /// Model name (ignored by the RAG endpoint)
    pub model: String,

    /// API key (prefer `OPENAI_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL; for the RAG provider this is the full endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Transport timeout for a single request
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions
    OpenAI,
    /// RAG endpoint taking a message list and returning `{"answer": ...}`
    Rag,
}

/// Parameters of the four checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Question used by the format and latency checks
    pub fixed_question: String,

    /// Question file used by the containment and validity checks
    pub questions_path: PathBuf,

    /// Upper bound for a single bot answer
    #[serde(with = "humantime_serde")]
    pub max_response_time: Duration,

    /// Share of questions that must pass, written as `"2/3"`
    pub pass_ratio: PassRatio,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            fixed_question: "Kto je dekan?".to_string(),
            questions_path: PathBuf::from("simple_questions.json"),
            max_response_time: Duration::from_secs(20),
            pass_ratio: PassRatio::TWO_THIRDS,
        }
    }
}

/// Exact fraction of a question set that must pass.
///
/// Kept as integers so `required(n)` is `ceil(numerator * n / denominator)`
/// with no floating point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PassRatio {
    numerator: u32,
    denominator: u32,
}

impl PassRatio {
    pub const TWO_THIRDS: PassRatio = PassRatio {
        numerator: 2,
        denominator: 3,
    };

    /// Create a ratio in (0, 1]
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if denominator == 0 || numerator == 0 || numerator > denominator {
            return Err(BotcheckError::Configuration(format!(
                "pass ratio must be in (0, 1], got {}/{}",
                numerator, denominator
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Minimum number of passing items out of `total`
    pub fn required(&self, total: usize) -> usize {
        (self.numerator as usize * total).div_ceil(self.denominator as usize)
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }
}

impl Default for PassRatio {
    fn default() -> Self {
        Self::TWO_THIRDS
    }
}

impl fmt::Display for PassRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for PassRatio {
    type Err = BotcheckError;

    fn from_str(s: &str) -> Result<Self> {
        let (num, den) = s.trim().split_once('/').ok_or_else(|| {
            BotcheckError::Configuration(format!("pass ratio must look like \"2/3\", got {:?}", s))
        })?;
        let parse = |part: &str| {
            part.trim().parse::<u32>().map_err(|e| {
                BotcheckError::Configuration(format!("invalid pass ratio {:?}: {}", s, e))
            })
        };
        Self::new(parse(num)?, parse(den)?)
    }
}

impl TryFrom<String> for PassRatio {
    type Error = BotcheckError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PassRatio> for String {
    fn from(ratio: PassRatio) -> Self {
        ratio.to_string()
    }
}

impl BotcheckConfig {
    /// Load configuration from defaults, files and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. `botcheck.toml` in the working directory
    /// 3. File named by `BOTCHECK_CONFIG_PATH`
    /// 4. `BOTCHECK_` environment variables, nested with `__`
    ///    (e.g. `BOTCHECK_SUITE__FIXED_QUESTION`)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Same as [`load`](Self::load), with an explicit file merged after
    /// `BOTCHECK_CONFIG_PATH` and before the environment.
    pub fn load_with(path: Option<&Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(BotcheckConfig::default()))
            .merge(Toml::file("botcheck.toml"));

        if let Ok(env_path) = std::env::var("BOTCHECK_CONFIG_PATH") {
            figment = figment.merge(Toml::file(env_path));
        }
        if let Some(path) = path {
            if !path.exists() {
                return Err(BotcheckError::NotFound(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: BotcheckConfig = figment
            .merge(Env::prefixed("BOTCHECK_").split("__"))
            .extract()
            .map_err(|e| {
                BotcheckError::Configuration(format!("Failed to load configuration: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file on top of the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let path = path.as_ref();
        if !path.exists() {
            return Err(BotcheckError::NotFound(path.to_path_buf()));
        }

        let config: BotcheckConfig = Figment::from(Serialized::defaults(BotcheckConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                BotcheckError::Configuration(format!("Failed to load configuration file: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        self.bot.validate("bot")?;
        self.reference.validate("reference")?;

        if self.reference.provider == ProviderKind::Rag {
            return Err(BotcheckError::Configuration(
                "reference model must be an openai-compatible provider".to_string(),
            ));
        }
        if self.suite.max_response_time.is_zero() {
            return Err(BotcheckError::Configuration(
                "suite.max_response_time must be greater than zero".to_string(),
            ));
        }
        if self.suite.fixed_question.trim().is_empty() {
            return Err(BotcheckError::Configuration(
                "suite.fixed_question must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl ProviderConfig {
    fn validate(&self, section: &str) -> Result<()> {
        match self.provider {
            ProviderKind::OpenAI if self.model.trim().is_empty() => Err(
                BotcheckError::Configuration(format!("{}.model must not be empty", section)),
            ),
            ProviderKind::Rag if self.base_url.is_none() => Err(BotcheckError::Configuration(
                format!("{}.base_url is required for the rag provider", section),
            )),
            _ => Ok(()),
        }
    }

    /// Resolve the API key: explicit value, then `OPENAI_API_KEY`, then the placeholder.
    pub fn resolved_api_key(&self) -> String {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = BotcheckConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.suite.max_response_time, Duration::from_secs(20));
        assert_eq!(config.suite.pass_ratio, PassRatio::TWO_THIRDS);
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn test_required_two_thirds() {
        let ratio = PassRatio::TWO_THIRDS;
        assert_eq!(ratio.required(0), 0);
        assert_eq!(ratio.required(1), 1);
        assert_eq!(ratio.required(3), 2);
        assert_eq!(ratio.required(4), 3);
        assert_eq!(ratio.required(6), 4);
        assert_eq!(ratio.required(10), 7);
    }

    #[test]
    fn test_pass_ratio_parse() {
        let ratio: PassRatio = "3/4".parse().unwrap();
        assert_eq!(ratio.numerator(), 3);
        assert_eq!(ratio.denominator(), 4);
        assert_eq!(ratio.to_string(), "3/4");

        assert!("0/3".parse::<PassRatio>().is_err());
        assert!("4/3".parse::<PassRatio>().is_err());
        assert!("1/0".parse::<PassRatio>().is_err());
        assert!("half".parse::<PassRatio>().is_err());
    }

    #[test]
    fn test_rag_requires_base_url() {
        let mut config = BotcheckConfig::default();
        config.bot.provider = ProviderKind::Rag;
        assert!(config.validate().is_err());

        config.bot.base_url = Some("http://localhost:8000/api/rag/get_rag_answer".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[bot]
provider = "rag"
model = ""
base_url = "http://localhost:8000/api/rag/get_rag_answer"
timeout = "30s"

[suite]
fixed_question = "Who is the dean?"
questions_path = "qa.json"
max_response_time = "5s"
pass_ratio = "1/2"
"#
        )
        .unwrap();

        let config = BotcheckConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bot.provider, ProviderKind::Rag);
        assert_eq!(config.bot.timeout, Duration::from_secs(30));
        assert_eq!(config.suite.fixed_question, "Who is the dean?");
        assert_eq!(config.suite.max_response_time, Duration::from_secs(5));
        assert_eq!(config.suite.pass_ratio.required(4), 2);
        // untouched sections keep their defaults
        assert_eq!(config.reference.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_from_file_missing() {
        let result = BotcheckConfig::from_file("/nonexistent/botcheck.toml");
        assert!(matches!(result, Err(BotcheckError::NotFound(_))));
    }
}
