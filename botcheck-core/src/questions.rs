//! Question sets for the containment and validity checks
//!
//! A question file is a JSON array of single-entry objects mapping a
//! question to the substring expected in a correct answer:
//!
//! ```json
//! [
//!     {"Kto je dekan?": "Igor Fabo"},
//!     {"Kde sídli fakulta?": "Bratislava"}
//! ]
//! ```

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{BotcheckError, Result};

/// One fixture entry: a question and the expected answer substring
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionAnswerPair {
    pub question: String,
    pub expected_answer: String,
}

impl QuestionAnswerPair {
    pub fn new(question: impl Into<String>, expected_answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            expected_answer: expected_answer.into(),
        }
    }

    /// Case-insensitive substring test against a bot answer
    pub fn is_contained_in(&self, answer: &str) -> bool {
        answer
            .to_lowercase()
            .contains(&self.expected_answer.to_lowercase())
    }
}

/// Ordered question set, in file order
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuestionSet {
    source: Option<PathBuf>,
    pairs: Vec<QuestionAnswerPair>,
}

impl QuestionSet {
    /// Build a set in memory
    pub fn from_pairs(pairs: Vec<QuestionAnswerPair>) -> Self {
        Self {
            source: None,
            pairs,
        }
    }

    /// Load a question set from a JSON file.
    ///
    /// # Errors
    ///
    /// - [`BotcheckError::NotFound`] if the path is missing, unreadable or a directory
    /// - [`BotcheckError::Format`] if the content is not a JSON array of
    ///   objects each holding exactly one string-valued entry
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(BotcheckError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound
            | std::io::ErrorKind::PermissionDenied
            | std::io::ErrorKind::IsADirectory => BotcheckError::NotFound(path.to_path_buf()),
            _ => BotcheckError::Io(e),
        })?;

        // invalid UTF-8 is a format error, not an IO error
        let set = Self::parse_slice(&content).map_err(|reason| BotcheckError::Format {
            path: path.to_path_buf(),
            reason,
        })?;

        tracing::debug!(path = %path.display(), questions = set.len(), "loaded question set");

        Ok(Self {
            source: Some(path.to_path_buf()),
            ..set
        })
    }

    /// Parse question set JSON; the error is a human-readable reason
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        Self::parse_slice(content.as_bytes())
    }

    fn parse_slice(content: &[u8]) -> std::result::Result<Self, String> {
        let data: Value = serde_json::from_slice(content).map_err(|e| e.to_string())?;

        let items = data
            .as_array()
            .ok_or_else(|| "JSON file must contain a list of dictionaries.".to_string())?;

        let pairs = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let object = item.as_object().ok_or_else(|| {
                    format!("JSON file must contain a list of dictionaries (item {}).", index)
                })?;
                if object.len() != 1 {
                    return Err(format!(
                        "item {} must map exactly one question to its answer, found {} entries",
                        index,
                        object.len()
                    ));
                }
                // exactly one entry, checked above
                let (question, answer) = object
                    .iter()
                    .next()
                    .ok_or_else(|| format!("item {} is empty", index))?;
                let answer = answer.as_str().ok_or_else(|| {
                    format!("item {}: expected answer for {:?} must be a string", index, question)
                })?;
                Ok(QuestionAnswerPair::new(question.clone(), answer))
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;

        Ok(Self::from_pairs(pairs))
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuestionAnswerPair> {
        self.pairs.iter()
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a QuestionAnswerPair;
    type IntoIter = std::slice::Iter<'a, QuestionAnswerPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
