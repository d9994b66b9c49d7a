//! Playing a single tossup
//!
//! Two activities race for every tossup: the reader revealing the text
//! and the listener waiting for the player to buzz. Whichever settles the
//! tossup first stops the other. Once the player buzzes, the listener
//! holds the reveal lock for the whole answer dialogue, so no reveal edit
//! can land after the buzz is announced.
//!
//! Scoring, by when the player buzzed and what the judge said:
//!
//! | judge                | text still being read | text fully read |
//! |----------------------|-----------------------|-----------------|
//! | accept, before mark  | power                 | -               |
//! | accept               | correct               | correct         |
//! | reject or no answer  | neg                   | dead            |

use std::time::Duration;

use enum_map::Enum;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    channel::Card,
    constants::scoring,
    error::Result,
    judge::{Verdict, grade},
    play::{Context, Play},
    question::{QuestionType, Tossup, to_markdown},
    reveal::{ReadState, ReaderExit, Reveal, read},
};

/// Scored result of a tossup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum TossupOutcome {
    /// Correct before the power mark was passed
    #[display("power")]
    Power,
    /// Correct after the power mark
    #[display("correct")]
    Correct,
    /// Wrong or silent while the text was still being read
    #[display("neg")]
    Neg,
    /// Nobody buzzed, or wrong or silent after the text was fully read
    #[display("dead")]
    Dead,
}

impl TossupOutcome {
    /// Points earned
    pub fn points(self) -> i64 {
        match self {
            Self::Power => scoring::POWER,
            Self::Correct => scoring::CORRECT,
            Self::Neg => scoring::NEG,
            Self::Dead => 0,
        }
    }

    /// Card announcing the outcome
    pub fn announcement(self) -> Card {
        match self {
            Self::Power => Card::success("power"),
            Self::Correct => Card::success("correct"),
            Self::Neg => Card::failure("neg"),
            Self::Dead => Card::failure("incorrect, dead tossup"),
        }
    }

    fn missed(state: &ReadState) -> Self {
        if state.finished() { Self::Dead } else { Self::Neg }
    }
}

/// Plays `tossup` with `ctx.player` until it is scored or ended
///
/// The tossup message is revealed chunk by chunk. Afterwards it is
/// replaced by the full text and the answer line is posted, whatever the
/// outcome.
///
/// # Errors
///
/// Fails when the channel or the judge fails. The reader is stopped and a
/// failure card is posted first. An unrecognized verdict is not an error:
/// the play ends as [`Play::EndedByUser`].
pub async fn play_tossup(ctx: &Context<'_>, tossup: &Tossup) -> Result<Play<TossupOutcome>> {
    let result = run(ctx, tossup).await;
    ctx.settle(result).await
}

async fn run(ctx: &Context<'_>, tossup: &Tossup) -> Result<Play<TossupOutcome>> {
    let timing = &ctx.settings.timing;
    let reveal = Reveal::new(&tossup.text, timing.chunk_size, true);
    let footer = tossup.metadata.footer(QuestionType::Tossup);
    let card = |text: &str| {
        Card::neutral("Tossup")
            .with_description(text)
            .with_footer(footer.clone())
    };

    let message = ctx.channel.send(card("")).await?;
    let state = ReadState::new(tossup.has_power());
    let buzz_window = reveal.duration(timing.reveal_delay) + timing.grace_period;

    let result = {
        let reader = read(
            &state,
            ctx.channel,
            message,
            &reveal,
            &card,
            timing.reveal_delay,
            timing.grace_period,
        );
        let listener = listen(ctx, &state, tossup.answer(), buzz_window);
        tokio::pin!(reader, listener);

        tokio::select! {
            biased;
            result = &mut listener => result,
            exit = &mut reader => match exit {
                ReaderExit::Expired if !state.buzzed() => Ok(Play::Completed(TossupOutcome::Dead)),
                ReaderExit::Failed(error) if !state.buzzed() => Err(error),
                exit => {
                    if let ReaderExit::Failed(error) = exit {
                        warn!(%error, "reveal failed after buzz");
                    }
                    listener.await
                }
            },
        }
    };
    state.cancel();
    let play = result?;

    match play {
        Play::Completed(outcome) => info!(%outcome, player = %ctx.player, "tossup scored"),
        Play::EndedByUser => info!(player = %ctx.player, "tossup ended by user"),
    }

    ctx.channel.edit(message, card(reveal.full_text())).await?;
    ctx.channel
        .send(Card::neutral(to_markdown(tossup.answer())))
        .await?;
    Ok(play)
}

/// Waits for a buzz, then runs the answer dialogue
async fn listen(
    ctx: &Context<'_>,
    state: &ReadState,
    answer_line: &str,
    buzz_window: Duration,
) -> Result<Play<TossupOutcome>> {
    let Some(buzz) = ctx.next_from_player(buzz_window, false).await? else {
        return Ok(Play::Completed(TossupOutcome::Dead));
    };
    if ctx.is_end(&buzz) {
        state.cancel();
        return Ok(Play::EndedByUser);
    }

    state.mark_buzzed();
    let _guard = state.lock().await;
    info!(player = %ctx.player, finished = state.finished(), "buzz");
    ctx.channel
        .send(Card::success("Buzz").with_description(format!("from {}", ctx.player)))
        .await?;
    if state.finished() {
        state.cancel();
    }

    let play = answer(ctx, state, answer_line).await;
    state.cancel();
    play
}

/// Collects answers until the judge settles, re-opening the window on prompts
async fn answer(
    ctx: &Context<'_>,
    state: &ReadState,
    answer_line: &str,
) -> Result<Play<TossupOutcome>> {
    let window = ctx.settings.timing.answer_window;
    loop {
        let Some(given) = ctx.next_from_player(window, false).await? else {
            return Ok(Play::Completed(TossupOutcome::missed(state)));
        };
        if ctx.is_end(&given) {
            return Ok(Play::EndedByUser);
        }

        match grade(ctx.judge, answer_line, &given.content).await? {
            Verdict::Accept if state.can_power() => {
                return Ok(Play::Completed(TossupOutcome::Power));
            }
            Verdict::Accept => return Ok(Play::Completed(TossupOutcome::Correct)),
            Verdict::Reject => return Ok(Play::Completed(TossupOutcome::missed(state))),
            Verdict::Prompt(hint) => {
                let card = Card::neutral("Prompt");
                let card = match hint {
                    Some(hint) => card.with_description(hint),
                    None => card,
                };
                ctx.channel.send(card).await?;
            }
        }
    }
}
