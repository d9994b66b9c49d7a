//! Question records and the question source
//!
//! Records mirror what the QB Reader `random-question` endpoint returns.
//! They are fetched once per play and never mutated.

use std::collections::BTreeSet;

use async_trait::async_trait;
use itertools::Itertools;
use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    constants::tossup::POWER_MARK,
    error::{Error, Result},
};

/// Kind of question requested from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Incrementally read question, first correct buzz wins
    #[display("tossup")]
    Tossup,
    /// Multi-part follow-up question
    #[display("bonus")]
    Bonus,
}

/// Filters sent to the question source
///
/// Built once per command by [`crate::filter::parse_query`]; absent
/// filters mean "any".
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Tossup or bonus
    pub question_type: QuestionType,
    /// Allowed difficulties, each within 0..=10
    pub difficulties: Option<BTreeSet<u8>>,
    /// Allowed canonical subcategory names
    pub subcategories: Option<BTreeSet<String>>,
}

impl Query {
    /// Unfiltered query for a question type
    pub fn any(question_type: QuestionType) -> Self {
        Self {
            question_type,
            difficulties: None,
            subcategories: None,
        }
    }
}

/// Where a question came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    /// Category name
    pub category: String,
    /// Subcategory name
    pub subcategory: String,
    /// Name of the question set
    pub set_name: String,
    /// Packet within the set
    pub packet_number: u32,
    /// Position within the packet
    pub question_number: u32,
    /// Difficulty from 0 to 10
    pub difficulty: u8,
}

impl Metadata {
    /// Card footer, e.g. `2021 ACF Fall | Packet 3 | Tossup 14 | Difficulty 4`
    pub fn footer(&self, question_type: QuestionType) -> String {
        let kind = match question_type {
            QuestionType::Tossup => "Tossup",
            QuestionType::Bonus => "Bonus",
        };
        [
            self.set_name.clone(),
            format!("Packet {}", self.packet_number),
            format!("{kind} {}", self.question_number),
            format!("Difficulty {}", self.difficulty),
        ]
        .iter()
        .join(" | ")
    }

    /// Category heading, with the subcategory when it differs
    pub fn heading(&self) -> String {
        if self.category == self.subcategory || self.subcategory.is_empty() {
            self.category.clone()
        } else {
            format!("{} | {}", self.category, self.subcategory)
        }
    }
}

/// A single tossup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tossup {
    /// Question prose, possibly containing the power mark and newlines
    #[serde(rename = "question")]
    pub text: String,
    /// Canonical answer line
    #[serde(rename = "answer")]
    pub answer_line: String,
    /// Answer line with HTML emphasis on the required part
    #[serde(default, alias = "formattedAnswer")]
    pub formatted_answer: Option<String>,
    /// Origin of the question
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl Tossup {
    /// Whether the text carries a power mark
    pub fn has_power(&self) -> bool {
        self.text.contains(POWER_MARK)
    }

    /// Answer line used for judging and display, preferring the formatted one
    pub fn answer(&self) -> &str {
        self.formatted_answer.as_deref().unwrap_or(&self.answer_line)
    }
}

/// A bonus: a lead-in followed by parts answered in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    /// Text read before the first part
    pub leadin: String,
    /// Part texts
    pub parts: Vec<String>,
    /// Answer line of each part
    pub answers: Vec<String>,
    /// Answer lines with HTML emphasis, parallel to `answers`
    #[serde(default, alias = "formattedAnswers")]
    pub formatted_answers: Option<Vec<String>>,
    /// Origin of the question
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl Bonus {
    /// Answer lines used for judging and display, preferring the formatted ones
    pub fn answers(&self) -> &[String] {
        match &self.formatted_answers {
            Some(formatted) if formatted.len() == self.answers.len() => formatted,
            _ => &self.answers,
        }
    }

    /// Rejects a bonus whose parts and answers do not line up
    ///
    /// # Errors
    ///
    /// Returns [`Error::Source`] when the counts differ.
    pub fn ensure_complete(self) -> Result<Self> {
        if self.parts.len() == self.answers.len() {
            Ok(self)
        } else {
            Err(Error::Source(format!(
                "bonus has {} parts but {} answers",
                self.parts.len(),
                self.answers.len()
            )))
        }
    }

    /// Parts paired with their answer lines
    pub fn parts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parts
            .iter()
            .map(String::as_str)
            .zip(self.answers().iter().map(String::as_str))
    }
}

/// Remote supplier of questions
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetches one tossup matching `query`
    async fn tossup(&self, query: &Query) -> Result<Tossup>;

    /// Fetches one bonus matching `query`
    async fn bonus(&self, query: &Query) -> Result<Bonus>;
}

/// Converts the emphasis markup of formatted answers to chat markdown
///
/// Bold becomes `**`, underline `__` and italics `*`; any other tag is
/// dropped. Entities are decoded, and non-breaking spaces become plain
/// spaces.
///
/// # Examples
///
/// ```rust
/// use qbot::question::to_markdown;
///
/// assert_eq!(
///     to_markdown("<b><u>Planck</u></b> constant [accept <i>h</i>]"),
///     "**__Planck__** constant [accept *h*]"
/// );
/// ```
pub fn to_markdown(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    push_markdown(fragment.root_element(), &mut out);
    out
}

/// Appends the text under `element`, wrapping emphasis in its markdown marker
fn push_markdown(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.replace('\u{a0}', " ")),
            Node::Element(tag) => {
                let marker = match tag.name() {
                    "b" | "strong" => "**",
                    "u" => "__",
                    "i" | "em" => "*",
                    _ => "",
                };
                if let Some(child) = ElementRef::wrap(child) {
                    out.push_str(marker);
                    push_markdown(child, out);
                    out.push_str(marker);
                }
            }
            _ => {}
        }
    }
}
