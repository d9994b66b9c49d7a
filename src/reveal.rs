//! Incremental reveal of tossup text
//!
//! A tossup is shown a few words at a time by repeatedly editing one
//! message. [`Reveal`] computes the growing chunks up front; [`read`] is
//! the timed reader driving the edits while a buzz may arrive at any time.
//!
//! The reader and the buzz listener share a [`ReadState`]: a lock that
//! keeps reveal edits from interleaving with the buzz dialogue, the power
//! and finished flags, and a cancellation token.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use itertools::Itertools;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    channel::{Card, Channel, MessageId},
    constants::tossup::POWER_MARK,
    error::Error,
};

/// The chunks a text is revealed in
///
/// Every chunk extends the previous one by whole words and the last chunk
/// is the whole text. When watching for the power mark, an extra chunk is
/// inserted that ends exactly on the mark whenever the regular stride
/// would step over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    chunks: Vec<String>,
    power_passed_at: Option<usize>,
}

impl Reveal {
    /// Splits `text` into chunks growing by `chunk_size` words
    ///
    /// # Examples
    ///
    /// ```rust
    /// use qbot::reveal::Reveal;
    ///
    /// let reveal = Reveal::new("In quantum (*) mechanics the square of this", 5, true);
    /// assert_eq!(
    ///     reveal.chunks(),
    ///     [
    ///         "In quantum (*)",
    ///         "In quantum (*) mechanics the",
    ///         "In quantum (*) mechanics the square of this",
    ///     ]
    /// );
    /// ```
    pub fn new(text: &str, chunk_size: usize, watch_power: bool) -> Self {
        let words = text.split_whitespace().collect_vec();
        let chunk_size = chunk_size.max(1);
        let power_word = watch_power
            .then(|| words.iter().position(|word| word.contains(POWER_MARK)))
            .flatten();

        let mut ends = Vec::with_capacity(words.len() / chunk_size + 2);
        let mut seen_power = false;
        for start in (0..words.len()).step_by(chunk_size) {
            let end = (start + chunk_size).min(words.len());
            if let Some(power) = power_word.filter(|&power| !seen_power && power < end) {
                if power + 1 < end {
                    ends.push(power + 1);
                }
                seen_power = true;
            }
            ends.push(end);
        }

        let chunks = if ends.is_empty() {
            vec![String::new()]
        } else {
            ends.iter().map(|&end| words[..end].join(" ")).collect()
        };
        let power_passed_at =
            power_word.and_then(|power| ends.iter().position(|&end| end > power + 1));

        Self {
            chunks,
            power_passed_at,
        }
    }

    /// The chunks in reveal order
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// The whole normalized text
    pub fn full_text(&self) -> &str {
        self.chunks.last().map_or("", String::as_str)
    }

    /// Index of the first chunk reaching past the power mark
    pub fn power_passed_at(&self) -> Option<usize> {
        self.power_passed_at
    }

    /// Time the reader spends before the last chunk is shown
    pub fn duration(&self, delay: Duration) -> Duration {
        delay.saturating_mul(u32::try_from(self.chunks.len()).unwrap_or(u32::MAX))
    }
}

/// State shared by the reader and the buzz listener of one tossup
#[derive(Debug)]
pub struct ReadState {
    lock: Mutex<()>,
    can_power: AtomicBool,
    finished: AtomicBool,
    buzzed: AtomicBool,
    cancel: CancellationToken,
}

impl ReadState {
    /// Fresh state; `can_power` is whether the text carries a power mark
    pub fn new(can_power: bool) -> Self {
        Self {
            lock: Mutex::new(()),
            can_power: AtomicBool::new(can_power),
            finished: AtomicBool::new(false),
            buzzed: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Takes the lock serializing edits of the tossup message
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Whether a correct answer now would still be a power
    pub fn can_power(&self) -> bool {
        self.can_power.load(Ordering::SeqCst)
    }

    /// Whether the last chunk has been shown
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Whether the player has buzzed
    pub fn buzzed(&self) -> bool {
        self.buzzed.load(Ordering::SeqCst)
    }

    /// Records a buzz; the reader stops editing from here on
    pub fn mark_buzzed(&self) {
        self.buzzed.store(true, Ordering::SeqCst);
    }

    /// Stops the reader. Calling it again, or after the reader is done, does nothing.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the reader was stopped
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Why the reader stopped
#[derive(Debug)]
pub enum ReaderExit {
    /// The whole text was shown and the grace period passed
    Expired,
    /// The reader was cancelled or yielded to a buzz
    Cancelled,
    /// Editing the tossup message failed
    Failed(Error),
}

/// Reveals `reveal` chunk by chunk into `message`
///
/// Before each chunk the reader waits `delay`, then edits the message
/// under the shared lock. Once the text has passed the power mark the
/// power flag is cleared. After the last chunk the finished flag is set
/// and the reader waits out `grace`.
pub async fn read<F>(
    state: &ReadState,
    channel: &dyn Channel,
    message: MessageId,
    reveal: &Reveal,
    card: F,
    delay: Duration,
    grace: Duration,
) -> ReaderExit
where
    F: Fn(&str) -> Card + Sync,
{
    for (index, chunk) in reveal.chunks().iter().enumerate() {
        tokio::select! {
            biased;
            () = state.cancel.cancelled() => return ReaderExit::Cancelled,
            () = tokio::time::sleep(delay) => {}
        }

        let guard = tokio::select! {
            biased;
            () = state.cancel.cancelled() => return ReaderExit::Cancelled,
            guard = state.lock() => guard,
        };
        if state.buzzed() || state.is_cancelled() {
            return ReaderExit::Cancelled;
        }

        if let Err(error) = channel.edit(message, card(chunk.as_str())).await {
            return ReaderExit::Failed(error);
        }
        debug!(index, %chunk, "revealed");

        if reveal.power_passed_at() == Some(index) && state.can_power.swap(false, Ordering::SeqCst)
        {
            debug!(index, "power mark passed");
        }
        drop(guard);
    }

    state.finished.store(true, Ordering::SeqCst);
    debug!("tossup fully read");

    tokio::select! {
        biased;
        () = state.cancel.cancelled() => ReaderExit::Cancelled,
        () = tokio::time::sleep(grace) => ReaderExit::Expired,
    }
}
