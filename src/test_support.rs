//! Scripted collaborators for tests

use std::{
    collections::VecDeque,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    channel::{
        AuthorId, Card, Channel, ChannelId, Message, MessageFilter, MessageId,
        local::{LocalChannel, Outgoing},
    },
    error::{Error, Result},
    judge::{AnswerJudge, Verdict},
    question::{Bonus, Metadata, Query, QuestionSource, Tossup},
};

/// Judge answering from a script, recording every call
#[derive(Debug, Default)]
pub struct ScriptedJudge {
    verdicts: Mutex<VecDeque<Result<Verdict>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedJudge {
    pub fn new(verdicts: impl IntoIterator<Item = Result<Verdict>>) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.into_iter().collect()),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl AnswerJudge for ScriptedJudge {
    async fn judge(&self, answer_line: &str, given: &str) -> Result<Verdict> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((answer_line.to_owned(), given.to_owned()));
        self.verdicts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(Error::Judge("script exhausted".into())))
    }
}

/// Question source handing out scripted questions, then failing
#[derive(Debug, Default)]
pub struct ScriptedSource {
    tossups: Mutex<VecDeque<Tossup>>,
    bonuses: Mutex<VecDeque<Bonus>>,
    queries: Mutex<Vec<Query>>,
}

impl ScriptedSource {
    pub fn tossups(tossups: impl IntoIterator<Item = Tossup>) -> Self {
        Self {
            tossups: Mutex::new(tossups.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn bonuses(bonuses: impl IntoIterator<Item = Bonus>) -> Self {
        Self {
            bonuses: Mutex::new(bonuses.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, query: &Query) {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
    }
}

#[async_trait]
impl QuestionSource for ScriptedSource {
    async fn tossup(&self, query: &Query) -> Result<Tossup> {
        self.record(query);
        self.tossups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or(Error::NoQuestion)
    }

    async fn bonus(&self, query: &Query) -> Result<Bonus> {
        self.record(query);
        self.bonuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or(Error::NoQuestion)
    }
}

/// Local channel whose `failing_edit`-th edit (1-based) fails after `stall`
pub struct BrokenEdits {
    inner: LocalChannel,
    failing_edit: usize,
    stall: Duration,
    edits: AtomicUsize,
}

impl BrokenEdits {
    pub fn new(inner: LocalChannel, failing_edit: usize, stall: Duration) -> Self {
        Self {
            inner,
            failing_edit,
            stall,
            edits: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Channel for BrokenEdits {
    fn id(&self) -> ChannelId {
        self.inner.id()
    }

    async fn send(&self, card: Card) -> Result<MessageId> {
        self.inner.send(card).await
    }

    async fn edit(&self, message: MessageId, card: Card) -> Result<()> {
        if self.edits.fetch_add(1, Ordering::SeqCst) + 1 == self.failing_edit {
            tokio::time::sleep(self.stall).await;
            return Err(Error::Channel("edit rejected".into()));
        }
        self.inner.edit(message, card).await
    }

    async fn next_message(
        &self,
        filter: MessageFilter<'_>,
        timeout: Option<Duration>,
    ) -> Result<Option<Message>> {
        self.inner.next_message(filter, timeout).await
    }
}

fn metadata() -> Metadata {
    Metadata {
        category: "Science".into(),
        subcategory: "Physics".into(),
        set_name: "2022 PACE NSC".into(),
        packet_number: 7,
        question_number: 12,
        difficulty: 4,
    }
}

/// Eight words, power mark after the third; read in chunks ending at 3, 5 and 8 words
pub fn quantum_tossup() -> Tossup {
    Tossup {
        text: "In quantum (*) mechanics the square of this".into(),
        answer_line: "wavefunction".into(),
        formatted_answer: Some("<b>wavefunction</b>".into()),
        metadata: metadata(),
    }
}

pub fn gas_bonus() -> Bonus {
    Bonus {
        leadin: "Answer the following about gases.".into(),
        parts: vec![
            "This law relates pressure and volume.".into(),
            "This law relates volume and temperature.".into(),
            "This constant is written R.".into(),
        ],
        answers: vec!["Boyle".into(), "Charles".into(), "gas constant".into()],
        formatted_answers: None,
        metadata: metadata(),
    }
}

/// Posts `content` from `author` after `millis` of (virtual) time
pub fn post_at(channel: &LocalChannel, millis: u64, author: AuthorId, content: &str) {
    let channel = channel.clone();
    let content = content.to_owned();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        channel.post(author, content);
    });
}

/// Everything posted or edited so far
pub fn drain(outgoing: &mut mpsc::UnboundedReceiver<Outgoing>) -> Vec<Outgoing> {
    std::iter::from_fn(|| outgoing.try_recv().ok()).collect()
}

/// Titles of the cards posted (not edited) so far
pub fn sent_titles(events: &[Outgoing]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Outgoing::Sent(_, Card { title, .. }) => Some(title.clone()),
            Outgoing::Edited(..) => None,
        })
        .collect()
}
