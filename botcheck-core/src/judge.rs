//! Judge prompt and verdict parsing
//!
//! The reference model grades a bot answer by replying `YES` or `NO`. The
//! reply is classified by a plain substring test on its upper-cased text, so
//! `"YESNO"` and `"yes, but..."` both count as positive.

use serde::Serialize;

/// Build the grading prompt sent to the reference model
pub fn judge_prompt(question: &str, expected: &str, answer: &str) -> String {
    format!(
        "I asked my bot question '{}', correct answer '{}', and got bot answer '{}'. \
         Check if the correct answer is contained in the bot's answer, and if so, \
         write only 'YES', and if not, write only 'NO'.",
        question, expected, answer
    )
}

/// Outcome of one judge call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeVerdict {
    Yes,
    No,
}

impl JudgeVerdict {
    /// Classify raw judge output
    pub fn parse(reply: &str) -> Self {
        if reply.trim().to_uppercase().contains("YES") {
            JudgeVerdict::Yes
        } else {
            JudgeVerdict::No
        }
    }

    pub fn is_yes(self) -> bool {
        self == JudgeVerdict::Yes
    }
}
