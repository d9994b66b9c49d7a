//! Answer grading
//!
//! Correctness is delegated entirely to an external judge: one round trip
//! per given answer, no local fuzzy matching and no retries.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Judge's decision about a given answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// The answer is correct
    Accept,
    /// The answer is wrong
    Reject,
    /// The answer is incomplete; ask again, optionally with a hint such as
    /// "which war?"
    Prompt(Option<String>),
}

impl Verdict {
    /// Builds a verdict from the judge's directive string
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedVerdict`] for anything other than
    /// `accept`, `reject` or `prompt`.
    pub fn from_directive(directive: &str, prompt: Option<String>) -> Result<Self> {
        match directive {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "prompt" => Ok(Self::Prompt(prompt.filter(|p| !p.trim().is_empty()))),
            other => Err(Error::UnrecognizedVerdict(other.to_owned())),
        }
    }
}

/// External service classifying answers against an answer line
#[async_trait]
pub trait AnswerJudge: Send + Sync {
    /// Judges `given` against `answer_line`
    async fn judge(&self, answer_line: &str, given: &str) -> Result<Verdict>;
}

/// Grades one answer with a single call to `judge`
///
/// # Errors
///
/// Propagates the judge's failure unchanged.
pub async fn grade(judge: &dyn AnswerJudge, answer_line: &str, given: &str) -> Result<Verdict> {
    let verdict = judge.judge(answer_line, given).await?;
    debug!(given, ?verdict, "graded answer");
    Ok(verdict)
}
