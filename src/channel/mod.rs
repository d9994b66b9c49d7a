//! Chat channel abstraction
//!
//! A play talks to exactly one text channel: it posts cards, edits the
//! card that carries the tossup text, and waits for the next message that
//! satisfies a filter. Implementations might wrap a chat service or, as
//! [`local::LocalChannel`] does, an in-process broadcast queue.

use std::time::Duration;

use async_trait::async_trait;
use derive_more::Display;
use serde::Serialize;

use crate::error::Result;

pub mod local;

/// Identifies a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display)]
pub struct ChannelId(pub u64);

/// Identifies a posted message so it can be edited later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub struct MessageId(pub u64);

/// Identifies the author of an incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display)]
#[display("<@{_0}>")]
pub struct AuthorId(pub u64);

/// An incoming chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Who wrote it
    pub author: AuthorId,
    /// Raw text
    pub content: String,
}

/// Color of a card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Tone {
    /// Informational
    #[default]
    Neutral,
    /// Something went right
    Success,
    /// Something went wrong
    Failure,
}

/// A rich message: title, optional body and footer, and named fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Heading line
    pub title: String,
    /// Body text
    pub description: Option<String>,
    /// Small print under the body
    pub footer: Option<String>,
    /// Named values shown side by side
    pub fields: Vec<(String, String)>,
    /// Color
    pub tone: Tone,
}

impl Card {
    /// Creates a card with a title and tone
    pub fn new(title: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            tone,
            ..Self::default()
        }
    }

    /// Informational card
    pub fn neutral(title: impl Into<String>) -> Self {
        Self::new(title, Tone::Neutral)
    }

    /// Success card
    pub fn success(title: impl Into<String>) -> Self {
        Self::new(title, Tone::Success)
    }

    /// Failure card
    pub fn failure(title: impl Into<String>) -> Self {
        Self::new(title, Tone::Failure)
    }

    /// Sets the body text
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the footer
    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Appends a named field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((name.into(), value.to_string()));
        self
    }
}

/// Filter deciding which incoming messages a wait accepts
pub type MessageFilter<'a> = &'a (dyn Fn(&Message) -> bool + Send + Sync);

/// A text channel a play is running in
#[async_trait]
pub trait Channel: Send + Sync {
    /// Identifier of this channel
    fn id(&self) -> ChannelId;

    /// Posts a card
    ///
    /// # Errors
    ///
    /// Fails when the underlying chat service rejects or drops the message.
    async fn send(&self, card: Card) -> Result<MessageId>;

    /// Replaces the content of a previously posted card
    ///
    /// # Errors
    ///
    /// Fails when the message no longer exists or the service is unreachable.
    async fn edit(&self, message: MessageId, card: Card) -> Result<()>;

    /// Waits for the next message accepted by `filter`
    ///
    /// Only messages arriving after the call are considered. Returns
    /// `Ok(None)` when `timeout` elapses first; a `None` timeout waits
    /// indefinitely.
    ///
    /// # Errors
    ///
    /// Fails when the channel stops delivering messages.
    async fn next_message(
        &self,
        filter: MessageFilter<'_>,
        timeout: Option<Duration>,
    ) -> Result<Option<Message>>;
}
