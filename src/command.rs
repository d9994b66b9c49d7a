//! Chat command surface
//!
//! Recognized commands, with any filters after the name:
//!
//! - `tossup` / `tu`: play one tossup
//! - `tk`: tossup session
//! - `bonus`: play one bonus
//! - `pk`: bonus session
//! - `end`: ends a running play; does nothing on its own
//!
//! Each channel runs at most one play at a time. Commands arriving while
//! a play is running in the channel are left to that play.

use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

use tracing::{debug, info};

use crate::{
    bonus::play_bonus,
    channel::{Card, Channel, ChannelId, Message},
    config::Settings,
    error::Result,
    filter::{format_difficulties, parse_query},
    judge::AnswerJudge,
    play::{Context, Play},
    question::{Query, QuestionSource, QuestionType},
    session::{run_bonus_session, run_tossup_session},
    tossup::play_tossup,
};

/// Command names
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum CommandKind {
    /// One tossup
    #[display("tossup")]
    Tossup,
    /// Tossup session
    #[display("tk")]
    TossupSession,
    /// One bonus
    #[display("bonus")]
    Bonus,
    /// Bonus session
    #[display("pk")]
    BonusSession,
    /// End token
    #[display("end")]
    End,
}

impl CommandKind {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "tossup" | "tu" => Self::Tossup,
            "tk" => Self::TossupSession,
            "bonus" => Self::Bonus,
            "pk" => Self::BonusSession,
            "end" => Self::End,
            _ => return None,
        })
    }

    /// Kind of question the command plays
    pub fn question_type(self) -> Option<QuestionType> {
        match self {
            Self::Tossup | Self::TossupSession => Some(QuestionType::Tossup),
            Self::Bonus | Self::BonusSession => Some(QuestionType::Bonus),
            Self::End => None,
        }
    }
}

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Which command
    pub kind: CommandKind,
    /// Whitespace separated arguments after the name
    pub args: Vec<String>,
}

impl Command {
    /// Parses `content` as a command under `prefix`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use qbot::command::{Command, CommandKind};
    ///
    /// let command = Command::parse(">", ">tu sci 3-5").unwrap();
    /// assert_eq!(command.kind, CommandKind::Tossup);
    /// assert_eq!(command.args, ["sci", "3-5"]);
    /// assert!(Command::parse(">", "tu").is_none());
    /// ```
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let mut words = content.trim().strip_prefix(prefix)?.split_whitespace();
        let kind = CommandKind::from_name(words.next()?)?;
        Some(Self {
            kind,
            args: words.map(str::to_owned).collect(),
        })
    }
}

/// Marks a channel busy until dropped
struct Busy<'a> {
    channels: &'a Mutex<HashSet<ChannelId>>,
    id: ChannelId,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Dispatches chat commands to plays and sessions
#[derive(Debug)]
pub struct Bot<Q, J> {
    source: Q,
    judge: J,
    settings: Settings,
    busy: Mutex<HashSet<ChannelId>>,
}

impl<Q: QuestionSource, J: AnswerJudge> Bot<Q, J> {
    /// Creates a bot using `source` for questions and `judge` for answers
    pub fn new(source: Q, judge: J, settings: Settings) -> Self {
        Self {
            source,
            judge,
            settings,
            busy: Mutex::default(),
        }
    }

    fn claim(&self, id: ChannelId) -> Option<Busy<'_>> {
        let newly_claimed = self
            .busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        newly_claimed.then_some(Busy {
            channels: &self.busy,
            id,
        })
    }

    /// Handles one incoming message, running a play to completion if it is a command
    ///
    /// # Errors
    ///
    /// Fails when a play or session fails; a failure card has already
    /// been posted by then.
    pub async fn handle(&self, channel: &dyn Channel, message: &Message) -> Result<()> {
        let Some(command) = Command::parse(&self.settings.prefix, &message.content) else {
            return Ok(());
        };
        let Some(question_type) = command.kind.question_type() else {
            return Ok(());
        };
        let Some(_busy) = self.claim(channel.id()) else {
            debug!(channel = %channel.id(), kind = %command.kind, "channel busy, command ignored");
            return Ok(());
        };

        let query = match parse_query(question_type, &command.args) {
            Ok(query) => query,
            Err(error) => {
                info!(%error, "rejected command arguments");
                channel
                    .send(Card::failure("invalid argument").with_description(error.to_string()))
                    .await?;
                return Ok(());
            }
        };
        info!(
            channel = %channel.id(),
            player = %message.author,
            kind = %command.kind,
            difficulties = ?query.difficulties.as_ref().map(format_difficulties),
            subcategories = ?query.subcategories,
            "command"
        );

        let ctx = Context {
            channel,
            judge: &self.judge,
            settings: &self.settings,
            player: message.author,
        };
        match command.kind {
            CommandKind::Tossup => self.single_tossup(&ctx, &query).await,
            CommandKind::TossupSession => run_tossup_session(&ctx, &self.source, &query)
                .await
                .map(drop),
            CommandKind::Bonus => self.single_bonus(&ctx, &query).await,
            CommandKind::BonusSession => run_bonus_session(&ctx, &self.source, &query)
                .await
                .map(drop),
            CommandKind::End => Ok(()),
        }
    }

    async fn single_tossup(&self, ctx: &Context<'_>, query: &Query) -> Result<()> {
        let tossup = match self.source.tossup(query).await {
            Ok(tossup) => tossup,
            Err(error) => {
                ctx.report_failure(&error).await;
                return Err(error);
            }
        };
        let card = match play_tossup(ctx, &tossup).await? {
            Play::Completed(outcome) => outcome.announcement(),
            Play::EndedByUser => Card::failure("ending tossup"),
        };
        ctx.channel.send(card).await.map(drop)
    }

    async fn single_bonus(&self, ctx: &Context<'_>, query: &Query) -> Result<()> {
        let bonus = match self.source.bonus(query).await {
            Ok(bonus) => bonus,
            Err(error) => {
                ctx.report_failure(&error).await;
                return Err(error);
            }
        };
        let card = match play_bonus(ctx, &bonus).await? {
            Play::Completed(result) => result.announcement(),
            Play::EndedByUser => Card::failure("ending bonus"),
        };
        ctx.channel.send(card).await.map(drop)
    }
}
