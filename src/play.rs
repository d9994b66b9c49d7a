//! Shared pieces of tossup and bonus plays
//!
//! Both plays talk to one player in one channel, wait for that player's
//! next message with a deadline, and treat `<prefix>end` as an interrupt
//! at every wait.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::{
    channel::{AuthorId, Card, Channel, Message},
    config::Settings,
    constants::bot::CHATTER_PREFIX,
    error::{Error, Result},
    judge::AnswerJudge,
};

/// How a single play finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Play<T> {
    /// The play reached a scored result
    Completed(T),
    /// The player sent the end command, or the play was abandoned
    EndedByUser,
}

impl<T> Play<T> {
    /// The scored result, if any
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::EndedByUser => None,
        }
    }
}

/// What a play needs from its surroundings
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Channel the play runs in
    pub channel: &'a dyn Channel,
    /// Judge grading the player's answers
    pub judge: &'a dyn AnswerJudge,
    /// Prefix and timers
    pub settings: &'a Settings,
    /// The player who started the play; nobody else can buzz or answer
    pub player: AuthorId,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("channel", &self.channel.id())
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}

impl Context<'_> {
    /// Waits up to `window` for the player's next message
    ///
    /// With `ignore_chatter`, messages starting with `_` are skipped as
    /// table talk.
    ///
    /// # Errors
    ///
    /// Fails when the channel stops delivering messages.
    pub async fn next_from_player(
        &self,
        window: Duration,
        ignore_chatter: bool,
    ) -> Result<Option<Message>> {
        let player = self.player;
        let filter = move |message: &Message| {
            message.author == player
                && !(ignore_chatter && message.content.starts_with(CHATTER_PREFIX))
        };
        self.channel.next_message(&filter, Some(window)).await
    }

    /// Whether `message` interrupts the play
    pub fn is_end(&self, message: &Message) -> bool {
        self.settings.is_end_command(&message.content)
    }

    /// Tells the channel a play failed, without letting a second failure mask the first
    pub async fn report_failure(&self, error: &Error) {
        warn!(%error, channel = %self.channel.id(), "play aborted");
        let card = if error.is_recoverable() {
            Card::failure("something went wrong, ending play")
        } else {
            Card::failure("something went wrong").with_description(error.to_string())
        };
        if let Err(send_error) = self.channel.send(card).await {
            warn!(%send_error, "could not report failure");
        }
    }

    /// Applies the abort policy to a finished play
    ///
    /// A nonsensical verdict ends the play as if the player had ended it;
    /// any other error is reported and returned.
    ///
    /// # Errors
    ///
    /// Returns every error that is not [recoverable](Error::is_recoverable).
    pub async fn settle<T>(&self, result: Result<Play<T>>) -> Result<Play<T>> {
        match result {
            Ok(play) => Ok(play),
            Err(error) => {
                self.report_failure(&error).await;
                if error.is_recoverable() {
                    Ok(Play::EndedByUser)
                } else {
                    Err(error)
                }
            }
        }
    }
}
