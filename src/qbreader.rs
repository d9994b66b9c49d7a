//! QB Reader API client
//!
//! # Endpoints
//!
//! - `POST /random-question` - one random tossup or bonus matching a [`Query`]
//! - `GET /check-answer` - judge a given answer against an answer line
//!
//! Both endpoints have answered in more than one shape over time (a bare
//! list or a wrapped object, a tuple or a named object), so responses are
//! decoded through untagged enums accepting either.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    constants::bot::REQUEST_TIMEOUT_MS,
    error::{Error, Result},
    judge::{AnswerJudge, Verdict},
    question::{Bonus, Query, QuestionSource, QuestionType, Tossup},
};

/// Response of `random-question`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Batch<T> {
    List(Vec<T>),
    Tossups { tossups: Vec<T> },
    Bonuses { bonuses: Vec<T> },
}

impl<T> Batch<T> {
    fn into_first(self) -> Result<T> {
        let (Self::List(questions)
        | Self::Tossups { tossups: questions }
        | Self::Bonuses { bonuses: questions }) = self;
        questions.into_iter().next().ok_or(Error::NoQuestion)
    }
}

/// Response of `check-answer`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Judgement {
    Pair(String, Option<String>),
    Named {
        directive: String,
        #[serde(default, rename = "directedPrompt")]
        directed_prompt: Option<String>,
    },
}

impl Judgement {
    fn into_verdict(self) -> Result<Verdict> {
        let (Self::Pair(directive, prompt)
        | Self::Named {
            directive,
            directed_prompt: prompt,
        }) = self;
        Verdict::from_directive(&directive, prompt)
    }
}

/// HTTP client for the QB Reader API, serving as both question source and judge
#[derive(Debug, Clone)]
pub struct QbReader {
    client: reqwest::Client,
    base: String,
}

impl QbReader {
    /// Creates a client for the API rooted at `base`, e.g. `https://www.qbreader.org/api`
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base)
    }

    /// Creates a client reusing an existing connection pool
    pub fn with_client(client: reqwest::Client, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into().trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base)
    }

    async fn random<T: DeserializeOwned>(&self, query: &Query) -> Result<T> {
        debug!(?query, "fetching random question");
        let source_error = |e: reqwest::Error| {
            warn!(error = %e, "question source request failed");
            Error::Source(e.to_string())
        };
        let batch: Batch<T> = self
            .client
            .post(self.url("random-question"))
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .json(query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(source_error)?
            .json()
            .await
            .map_err(source_error)?;
        batch.into_first()
    }
}

#[async_trait]
impl QuestionSource for QbReader {
    async fn tossup(&self, query: &Query) -> Result<Tossup> {
        debug_assert_eq!(query.question_type, QuestionType::Tossup);
        self.random(query).await
    }

    async fn bonus(&self, query: &Query) -> Result<Bonus> {
        debug_assert_eq!(query.question_type, QuestionType::Bonus);
        let bonus: Bonus = self.random(query).await?;
        bonus.ensure_complete().inspect_err(|error| {
            warn!(%error, "question source returned a malformed bonus");
        })
    }
}

#[async_trait]
impl AnswerJudge for QbReader {
    async fn judge(&self, answer_line: &str, given: &str) -> Result<Verdict> {
        let judge_error = |e: reqwest::Error| {
            warn!(error = %e, "answer judge request failed");
            Error::Judge(e.to_string())
        };
        let judgement: Judgement = self
            .client
            .get(self.url("check-answer"))
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .query(&[("answerline", answer_line), ("givenAnswer", given)])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(judge_error)?
            .json()
            .await
            .map_err(judge_error)?;
        judgement.into_verdict()
    }
}
