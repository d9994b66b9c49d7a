//! Failures of the external collaborators
//!
//! Timeouts are never errors here: a missing buzz or answer is a regular
//! outcome. These variants cover the channel, the question source and the
//! answer judge misbehaving.

use thiserror::Error;

/// Errors raised while a question is being played
#[derive(Error, Debug)]
pub enum Error {
    /// Sending, editing or receiving a chat message failed
    #[error("channel error: {0}")]
    Channel(String),

    /// The question source could not be reached or answered garbage
    #[error("question source failed: {0}")]
    Source(String),

    /// The question source answered with an empty result
    #[error("no question matched the filters")]
    NoQuestion,

    /// The answer judge could not be reached or answered garbage
    #[error("answer judge failed: {0}")]
    Judge(String),

    /// The answer judge answered with a directive outside accept/reject/prompt
    #[error("answer judge returned unrecognized directive `{0}`")]
    UnrecognizedVerdict(String),
}

impl Error {
    /// Whether the error may end the current play without ending the whole session loop
    ///
    /// Only a nonsensical verdict qualifies; every other failure leaves the
    /// play in a state that cannot be resumed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnrecognizedVerdict(_))
    }
}

/// Result alias used by the play loops
pub type Result<T, E = Error> = std::result::Result<T, E>;
