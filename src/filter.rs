//! Command argument parsing into question filters
//!
//! Arguments containing a digit are difficulty ranges, purely alphabetic
//! arguments are category names or aliases, and anything else is
//! rejected. Parsing happens before any question is fetched, so a bad
//! argument costs nothing but a retry.

use std::collections::BTreeSet;

use itertools::Itertools;
use thiserror::Error;

use crate::{
    category::{self, MAX_NAME_WORDS},
    constants::difficulty::{MAX, MIN},
    question::{Query, QuestionType},
};

/// Errors raised while parsing filters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The argument is neither a difficulty nor a category word
    #[error("invalid argument `{0}`")]
    InvalidArgument(String),
    /// The argument looks like a difficulty range but is malformed
    #[error("invalid difficulty `{0}`")]
    InvalidDifficulty(String),
    /// A difficulty outside 0-10 was requested
    #[error("invalid difficulty {0}, only {min}-{max} are allowed", min = MIN, max = MAX)]
    OutOfRange(i64),
    /// The range contains no difficulty at all, e.g. `5-3`
    #[error("difficulty range `{0}` is empty")]
    EmptyRange(String),
    /// No category, subcategory or alias has this name
    #[error("invalid category `{0}`")]
    UnknownCategory(String),
}

/// Parses a difficulty typed inside a token, rejecting values outside 0-10
fn number(token: &str, digits: &str) -> Result<i64, Error> {
    let value: i64 = digits
        .trim()
        .parse()
        .map_err(|_| Error::InvalidDifficulty(token.to_string()))?;
    if (i64::from(MIN)..=i64::from(MAX)).contains(&value) {
        Ok(value)
    } else {
        Err(Error::OutOfRange(value))
    }
}

/// Parses one difficulty token into an inclusive range
fn parse_range(token: &str) -> Result<(i64, i64), Error> {
    let (low, high) = if let Some(n) = token.strip_prefix("<=") {
        (i64::from(MIN), number(token, n)?)
    } else if let Some(n) = token.strip_prefix('<') {
        (i64::from(MIN), number(token, n)? - 1)
    } else if let Some(n) = token.strip_prefix(">=") {
        (number(token, n)?, i64::from(MAX))
    } else if let Some(n) = token.strip_prefix('>') {
        (number(token, n)? + 1, i64::from(MAX))
    } else if let Some(n) = token.strip_suffix('+') {
        (number(token, n)?, i64::from(MAX))
    } else if let Some(n) = token.strip_suffix('-') {
        (i64::from(MIN), number(token, n)?)
    } else if let Some((start, end)) = token.split_once('-') {
        (number(token, start)?, number(token, end)?)
    } else {
        let n = number(token, token)?;
        (n, n)
    };

    if low > high {
        return Err(Error::EmptyRange(token.to_string()));
    }
    Ok((low, high))
}

/// Parses difficulty tokens into the union of their ranges
///
/// Accepted forms are `n`, `n-m`, `n-` (n and below), `n+` (n and above),
/// `<n`, `<=n`, `>n` and `>=n`.
///
/// # Errors
///
/// Fails on malformed tokens, on any bound outside 0-10 and on empty ranges.
///
/// # Examples
///
/// ```rust
/// use qbot::filter::parse_difficulty_range;
///
/// let difficulties = parse_difficulty_range(&["2-", "4-5", "8+"]).unwrap();
/// assert_eq!(difficulties.into_iter().collect::<Vec<_>>(), [0, 1, 2, 4, 5, 8, 9, 10]);
///
/// let difficulties = parse_difficulty_range(&["<3", ">5"]).unwrap();
/// assert_eq!(difficulties.into_iter().collect::<Vec<_>>(), [0, 1, 2, 6, 7, 8, 9, 10]);
///
/// assert!(parse_difficulty_range(&["11"]).is_err());
/// ```
pub fn parse_difficulty_range<S: AsRef<str>>(tokens: &[S]) -> Result<BTreeSet<u8>, Error> {
    let mut difficulties = BTreeSet::new();
    for token in tokens {
        let (low, high) = parse_range(token.as_ref().trim())?;
        difficulties.extend((low..=high).filter_map(|d| u8::try_from(d).ok()));
    }
    Ok(difficulties)
}

/// Formats difficulties as compact `n` / `n-m` tokens
///
/// The output parses back to the same set with [`parse_difficulty_range`].
pub fn format_difficulties(difficulties: &BTreeSet<u8>) -> Vec<String> {
    difficulties
        .iter()
        .map(|&d| (d, d))
        .coalesce(|(a_low, a_high), (b_low, b_high)| {
            if a_high + 1 == b_low {
                Ok((a_low, b_high))
            } else {
                Err(((a_low, a_high), (b_low, b_high)))
            }
        })
        .map(|(low, high)| {
            if low == high {
                low.to_string()
            } else {
                format!("{low}-{high}")
            }
        })
        .collect()
}

/// Resolves category words into canonical subcategory names
///
/// Consecutive words are joined greedily, longest first, so that
/// multi-word aliases like `us lit` or `vis fine art` are recognized.
///
/// # Errors
///
/// Fails with [`Error::UnknownCategory`] when a word starts no known name.
///
/// # Examples
///
/// ```rust
/// use qbot::filter::parse_subcategories;
///
/// let subs = parse_subcategories(&["sci", "us", "hist"]).unwrap();
/// assert!(subs.contains("American History"));
/// assert!(subs.contains("Biology"));
/// assert_eq!(subs.len(), 6);
/// ```
pub fn parse_subcategories<S: AsRef<str>>(words: &[S]) -> Result<BTreeSet<String>, Error> {
    let mut subcategories = BTreeSet::new();
    let mut index = 0;
    while index < words.len() {
        let longest = MAX_NAME_WORDS.min(words.len() - index);
        let (taken, resolved) = (1..=longest)
            .rev()
            .find_map(|span| {
                let phrase = words[index..index + span]
                    .iter()
                    .map(AsRef::as_ref)
                    .join(" ");
                category::resolve(&phrase).map(|subs| (span, subs))
            })
            .ok_or_else(|| Error::UnknownCategory(words[index].as_ref().to_string()))?;
        subcategories.extend(resolved.iter().map(ToString::to_string));
        index += taken;
    }
    Ok(subcategories)
}

/// Builds a [`Query`] from raw command arguments
///
/// # Errors
///
/// Fails on the first argument that is not a valid difficulty or category.
pub fn parse_query<S: AsRef<str>>(question_type: QuestionType, args: &[S]) -> Result<Query, Error> {
    let mut ranges = Vec::new();
    let mut words = Vec::new();

    for arg in args.iter().map(AsRef::as_ref) {
        if arg.chars().any(|c| c.is_ascii_digit()) {
            ranges.push(arg);
        } else if !arg.is_empty() && arg.chars().all(char::is_alphabetic) {
            words.push(arg);
        } else {
            return Err(Error::InvalidArgument(arg.to_string()));
        }
    }

    Ok(Query {
        question_type,
        difficulties: if ranges.is_empty() {
            None
        } else {
            Some(parse_difficulty_range(&ranges)?)
        },
        subcategories: if words.is_empty() {
            None
        } else {
            Some(parse_subcategories(&words)?)
        },
    })
}
