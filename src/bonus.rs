//! Playing a single bonus
//!
//! The lead-in is posted, then each part in turn. A part waits for the
//! player's answer (ignoring `_` table talk), loops on prompts and scores
//! ten points when accepted. Running out of time on a part counts it as
//! missed. The end command at any wait abandons the whole bonus.

use serde::Serialize;
use tracing::info;

use crate::{
    channel::Card,
    constants::scoring,
    error::Result,
    judge::{Verdict, grade},
    play::{Context, Play},
    question::{Bonus, QuestionType, to_markdown},
};

/// Result of one bonus part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum PartOutcome {
    /// Accepted
    #[display("correct")]
    Correct,
    /// Rejected or unanswered in time
    #[display("incorrect")]
    Incorrect,
}

/// Results of every part of a bonus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BonusResult {
    /// One entry per part, in order
    pub parts: Vec<PartOutcome>,
}

impl BonusResult {
    /// Points earned
    pub fn points(&self) -> u64 {
        self.parts
            .iter()
            .filter(|part| **part == PartOutcome::Correct)
            .count() as u64
            * scoring::BONUS_PART
    }

    /// Points available
    pub fn max_points(&self) -> u64 {
        self.parts.len() as u64 * scoring::BONUS_PART
    }

    /// Card with the score, e.g. `20/30`
    pub fn announcement(&self) -> Card {
        Card::neutral(format!("{}/{}", self.points(), self.max_points()))
    }
}

/// Plays `bonus` with `ctx.player` until every part is answered or the play is ended
///
/// # Errors
///
/// Fails when the channel or the judge fails, after posting a failure
/// card. An unrecognized verdict ends the play as [`Play::EndedByUser`].
pub async fn play_bonus(ctx: &Context<'_>, bonus: &Bonus) -> Result<Play<BonusResult>> {
    let result = run(ctx, bonus).await;
    ctx.settle(result).await
}

async fn run(ctx: &Context<'_>, bonus: &Bonus) -> Result<Play<BonusResult>> {
    ctx.channel
        .send(
            Card::neutral(bonus.metadata.heading())
                .with_description(bonus.leadin.as_str())
                .with_footer(bonus.metadata.footer(QuestionType::Bonus)),
        )
        .await?;

    let mut result = BonusResult::default();
    for (number, (part, answer_line)) in bonus.parts().enumerate() {
        ctx.channel
            .send(Card::neutral((number + 1).to_string()).with_description(part))
            .await?;

        let Play::Completed(outcome) = play_part(ctx, answer_line).await? else {
            info!(player = %ctx.player, "bonus ended by user");
            return Ok(Play::EndedByUser);
        };
        let card = match outcome {
            PartOutcome::Correct => Card::success("Correct"),
            PartOutcome::Incorrect => Card::failure("Incorrect"),
        };
        ctx.channel
            .send(card.with_description(to_markdown(answer_line)))
            .await?;
        result.parts.push(outcome);
    }

    info!(player = %ctx.player, points = result.points(), "bonus scored");
    Ok(Play::Completed(result))
}

async fn play_part(ctx: &Context<'_>, answer_line: &str) -> Result<Play<PartOutcome>> {
    let window = ctx.settings.timing.bonus_window;
    loop {
        let Some(given) = ctx.next_from_player(window, true).await? else {
            return Ok(Play::Completed(PartOutcome::Incorrect));
        };
        if ctx.is_end(&given) {
            return Ok(Play::EndedByUser);
        }

        match grade(ctx.judge, answer_line, &given.content).await? {
            Verdict::Accept => return Ok(Play::Completed(PartOutcome::Correct)),
            Verdict::Reject => return Ok(Play::Completed(PartOutcome::Incorrect)),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        channel::{AuthorId, ChannelId, local::LocalChannel},
        config::Settings,
        test_support::{ScriptedJudge, drain, gas_bonus, post_at, sent_titles},
    };

    const PLAYER: AuthorId = AuthorId(7);

    #[tokio::test(start_paused = true)]
    async fn test_parts_are_scored_in_order() {
        let (channel, mut outgoing) = LocalChannel::new(ChannelId(1));
        let judge = ScriptedJudge::new([
            Ok(Verdict::Accept),
            Ok(Verdict::Prompt(None)),
            Ok(Verdict::Reject),
            Ok(Verdict::Accept),
        ]);
        let settings = Settings::default();
        let ctx = Context {
            channel: &channel,
            judge: &judge,
            settings: &settings,
            player: PLAYER,
        };
        post_at(&channel, 1_000, PLAYER, "boyle");
        post_at(&channel, 2_000, PLAYER, "_ charles or gay-lussac?");
        post_at(&channel, 3_000, AuthorId(8), "gay-lussac");
        post_at(&channel, 4_000, PLAYER, "gay-lussac");
        post_at(&channel, 5_000, PLAYER, "law of volumes");
        post_at(&channel, 6_000, PLAYER, "R");

        let result = play_bonus(&ctx, &gas_bonus()).await.unwrap();

        let result = result.completed().unwrap();
        assert_eq!(
            result.parts,
            [PartOutcome::Correct, PartOutcome::Incorrect, PartOutcome::Correct]
        );
        assert_eq!(result.points(), 20);
        assert_eq!(result.announcement().title, "20/30");

        let given = judge.calls().into_iter().map(|(_, given)| given).collect::<Vec<_>>();
        assert_eq!(given, ["boyle", "gay-lussac", "law of volumes", "R"]);
        assert_eq!(
            sent_titles(&drain(&mut outgoing)),
            ["Science | Physics", "1", "Correct", "2", "Prompt", "Incorrect", "3", "Correct"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_part_timeout_counts_as_incorrect() {
        let (channel, _outgoing) = LocalChannel::new(ChannelId(1));
        let judge = ScriptedJudge::new([Ok(Verdict::Accept), Ok(Verdict::Accept)]);
        let settings = Settings::default();
        let ctx = Context {
            channel: &channel,
            judge: &judge,
            settings: &settings,
            player: PLAYER,
        };
        post_at(&channel, 1_000, PLAYER, "boyle");
        post_at(&channel, 70_000, PLAYER, "gas constant");

        let result = play_bonus(&ctx, &gas_bonus()).await.unwrap();
        assert_eq!(
            result.completed().map(|r| r.parts),
            Some(vec![
                PartOutcome::Correct,
                PartOutcome::Incorrect,
                PartOutcome::Correct
            ])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_command_abandons_bonus() {
        let (channel, mut outgoing) = LocalChannel::new(ChannelId(1));
        let judge = ScriptedJudge::new([Ok(Verdict::Accept)]);
        let settings = Settings::default();
        let ctx = Context {
            channel: &channel,
            judge: &judge,
            settings: &settings,
            player: PLAYER,
        };
        post_at(&channel, 1_000, PLAYER, "boyle");
        post_at(&channel, 2_000, PLAYER, ">end");

        let result = play_bonus(&ctx, &gas_bonus()).await.unwrap();
        assert_eq!(result, Play::EndedByUser);
        assert_eq!(
            sent_titles(&drain(&mut outgoing)),
            ["Science | Physics", "1", "Correct", "2"]
        );
    }

    #[test]
    fn test_max_points_follow_part_count() {
        let result = BonusResult {
            parts: vec![PartOutcome::Correct; 4],
        };
        assert_eq!(result.points(), 40);
        assert_eq!(result.announcement().title, "40/40");
    }
}
