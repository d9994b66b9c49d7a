//! In-process channel
//!
//! Incoming messages are fanned out through a `tokio` broadcast queue so a
//! waiter only ever sees messages posted after it started waiting. Posted
//! and edited cards are forwarded to an unbounded receiver, which the
//! terminal front-end prints and tests inspect.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tracing::trace;

use super::{AuthorId, Card, Channel, ChannelId, Message, MessageFilter, MessageId};
use crate::error::{Error, Result};

/// Incoming messages buffered per waiter before older ones are skipped
const BACKLOG: usize = 64;

/// Something the engine did to the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// A new card was posted
    Sent(MessageId, Card),
    /// An existing card was replaced
    Edited(MessageId, Card),
}

impl Outgoing {
    /// The card carried by this event
    pub fn card(&self) -> &Card {
        match self {
            Self::Sent(_, card) | Self::Edited(_, card) => card,
        }
    }
}

/// A channel living entirely inside the process
#[derive(Debug, Clone)]
pub struct LocalChannel {
    id: ChannelId,
    incoming: broadcast::Sender<Message>,
    outgoing: mpsc::UnboundedSender<Outgoing>,
    next_message_id: Arc<AtomicU64>,
}

impl LocalChannel {
    /// Creates a channel and the receiver of everything it posts
    pub fn new(id: ChannelId) -> (Self, mpsc::UnboundedReceiver<Outgoing>) {
        let (incoming, _) = broadcast::channel(BACKLOG);
        let (outgoing, receiver) = mpsc::unbounded_channel();
        let channel = Self {
            id,
            incoming,
            outgoing,
            next_message_id: Arc::new(AtomicU64::new(1)),
        };
        (channel, receiver)
    }

    /// Delivers a message from `author` to everyone currently waiting
    pub fn post(&self, author: AuthorId, content: impl Into<String>) {
        let message = Message {
            author,
            content: content.into(),
        };
        trace!(channel = %self.id, ?message, "incoming");
        // Nobody waiting means nobody would have seen it.
        let _ = self.incoming.send(message);
    }

    fn emit(&self, event: Outgoing) -> Result<()> {
        self.outgoing
            .send(event)
            .map_err(|_| Error::Channel(format!("channel {} has no reader", self.id)))
    }
}

#[async_trait]
impl Channel for LocalChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    async fn send(&self, card: Card) -> Result<MessageId> {
        let id = MessageId(self.next_message_id.fetch_add(1, Ordering::Relaxed));
        self.emit(Outgoing::Sent(id, card))?;
        Ok(id)
    }

    async fn edit(&self, message: MessageId, card: Card) -> Result<()> {
        if message.0 >= self.next_message_id.load(Ordering::Relaxed) {
            return Err(Error::Channel(format!("unknown message {message}")));
        }
        self.emit(Outgoing::Edited(message, card))
    }

    async fn next_message(
        &self,
        filter: MessageFilter<'_>,
        timeout: Option<Duration>,
    ) -> Result<Option<Message>> {
        let mut receiver = self.incoming.subscribe();
        let wait = async {
            loop {
                match receiver.recv().await {
                    Ok(message) if filter(&message) => return Ok(Some(message)),
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(Error::Channel(format!("channel {} closed", self.id)));
                    }
                }
            }
        };
        match timeout {
            Some(timeout) => tokio::time::timeout(timeout, wait)
                .await
                .unwrap_or(Ok(None)),
            None => wait.await,
        }
    }
}
