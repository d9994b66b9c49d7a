//! Running sessions (`tk` and `pk`)
//!
//! A session plays fresh questions under one fixed query until the player
//! ends it, then posts cumulative statistics. A `tk` session also gives the
//! player a short window after every tossup to end it without starting the
//! next one.

use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::{
    bonus::play_bonus,
    channel::{Card, Message},
    error::Result,
    play::{Context, Play},
    question::{Query, QuestionSource},
    stats::{BonusStats, TossupStats},
    tossup::play_tossup,
};

/// Runs tossups until the player ends the session
///
/// # Errors
///
/// Fails when fetching or playing a tossup fails. The statistics so far
/// are still posted.
pub async fn run_tossup_session(
    ctx: &Context<'_>,
    source: &dyn QuestionSource,
    query: &Query,
) -> Result<TossupStats> {
    let span = info_span!("tk", session = %Uuid::new_v4(), player = %ctx.player);
    async move {
        let mut stats = TossupStats::default();
        let result = tossup_loop(ctx, source, query, &mut stats).await;
        info!(heard = stats.heard(), points = stats.points(), "tk session over");
        finish(ctx, stats.summary(), result).await.map(|()| stats)
    }
    .instrument(span)
    .await
}

/// Runs bonuses until the player ends the session
///
/// # Errors
///
/// Fails when fetching or playing a bonus fails. The statistics so far
/// are still posted.
pub async fn run_bonus_session(
    ctx: &Context<'_>,
    source: &dyn QuestionSource,
    query: &Query,
) -> Result<BonusStats> {
    let span = info_span!("pk", session = %Uuid::new_v4(), player = %ctx.player);
    async move {
        let mut stats = BonusStats::default();
        let result = bonus_loop(ctx, source, query, &mut stats).await;
        info!(bonuses = stats.bonuses, points = stats.points, "pk session over");
        finish(ctx, stats.summary(), result).await.map(|()| stats)
    }
    .instrument(span)
    .await
}

async fn tossup_loop(
    ctx: &Context<'_>,
    source: &dyn QuestionSource,
    query: &Query,
    stats: &mut TossupStats,
) -> Result<()> {
    loop {
        let tossup = match source.tossup(query).await {
            Ok(tossup) => tossup,
            Err(error) => {
                ctx.report_failure(&error).await;
                return Err(error);
            }
        };
        let Play::Completed(outcome) = play_tossup(ctx, &tossup).await? else {
            return Ok(());
        };
        stats.record(outcome);
        ctx.channel.send(outcome.announcement()).await?;

        if ended_between_questions(ctx).await? {
            return Ok(());
        }
    }
}

async fn bonus_loop(
    ctx: &Context<'_>,
    source: &dyn QuestionSource,
    query: &Query,
    stats: &mut BonusStats,
) -> Result<()> {
    loop {
        let bonus = match source.bonus(query).await {
            Ok(bonus) => bonus,
            Err(error) => {
                ctx.report_failure(&error).await;
                return Err(error);
            }
        };
        let Play::Completed(result) = play_bonus(ctx, &bonus).await? else {
            return Ok(());
        };
        stats.record(&result);
        ctx.channel.send(result.announcement()).await?;
    }
}

/// Waits the end probe window for the player's end command
async fn ended_between_questions(ctx: &Context<'_>) -> Result<bool> {
    let player = ctx.player;
    let settings = ctx.settings;
    let filter = move |message: &Message| {
        message.author == player && settings.is_end_command(&message.content)
    };
    let ended = ctx
        .channel
        .next_message(&filter, Some(settings.timing.end_probe))
        .await?;
    Ok(ended.is_some())
}

/// Posts the summary, keeping the session's error if there was one
async fn finish(ctx: &Context<'_>, summary: Card, result: Result<()>) -> Result<()> {
    let sent = ctx.channel.send(summary).await;
    result?;
    sent.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        channel::{
            AuthorId, Card, ChannelId,
            local::{LocalChannel, Outgoing},
        },
        config::Settings,
        error::Error,
        judge::Verdict,
        question::QuestionType,
        test_support::{
            ScriptedJudge, ScriptedSource, drain, gas_bonus, post_at, quantum_tossup, sent_titles,
        },
        tossup::TossupOutcome,
    };

    const PLAYER: AuthorId = AuthorId(3);

    fn last_summary(events: &[Outgoing]) -> Card {
        events
            .iter()
            .rev()
            .find(|event| event.card().title == "Session Stats")
            .map(|event| event.card().clone())
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_tk_runs_until_end_between_tossups() {
        let (channel, mut outgoing) = LocalChannel::new(ChannelId(1));
        let judge = ScriptedJudge::new([Ok(Verdict::Accept)]);
        let source = ScriptedSource::tossups([quantum_tossup(), quantum_tossup()]);
        let settings = Settings::default();
        let ctx = Context {
            channel: &channel,
            judge: &judge,
            settings: &settings,
            player: PLAYER,
        };
        // First tossup: power at 1500, end probe until 4700. Second tossup
        // goes dead at 12100; the end command lands in the following probe.
        post_at(&channel, 1_000, PLAYER, "buzz");
        post_at(&channel, 1_500, PLAYER, "psi");
        post_at(&channel, 13_000, PLAYER, ">end");

        let query = Query::any(QuestionType::Tossup);
        let stats = run_tossup_session(&ctx, &source, &query).await.unwrap();

        assert_eq!(stats.heard(), 2);
        assert_eq!(stats.count(TossupOutcome::Power), 1);
        assert_eq!(stats.count(TossupOutcome::Dead), 1);
        assert_eq!(stats.points(), 15);
        assert_eq!(source.queries(), [query.clone(), query]);

        let events = drain(&mut outgoing);
        let titles = sent_titles(&events);
        assert!(titles.contains(&"power".to_string()));
        assert!(titles.contains(&"incorrect, dead tossup".to_string()));
        assert_eq!(titles.last().map(String::as_str), Some("Session Stats"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tk_ended_during_tossup_records_nothing() {
        let (channel, mut outgoing) = LocalChannel::new(ChannelId(1));
        let judge = ScriptedJudge::new([]);
        let source = ScriptedSource::tossups([quantum_tossup(), quantum_tossup()]);
        let settings = Settings::default();
        let ctx = Context {
            channel: &channel,
            judge: &judge,
            settings: &settings,
            player: PLAYER,
        };
        post_at(&channel, 1_000, PLAYER, ">end");

        let stats = run_tossup_session(&ctx, &source, &Query::any(QuestionType::Tossup))
            .await
            .unwrap();

        assert_eq!(stats.heard(), 0);
        assert_eq!(source.queries().len(), 1);
        let summary = last_summary(&drain(&mut outgoing));
        assert!(summary.fields.contains(&("PP20TUH".into(), "no tossups heard".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_failure_halts_session_with_summary() {
        let (channel, mut outgoing) = LocalChannel::new(ChannelId(1));
        let judge = ScriptedJudge::new([]);
        let source = ScriptedSource::tossups([]);
        let settings = Settings::default();
        let ctx = Context {
            channel: &channel,
            judge: &judge,
            settings: &settings,
            player: PLAYER,
        };

        let result = run_tossup_session(&ctx, &source, &Query::any(QuestionType::Tossup)).await;

        assert!(matches!(result, Err(Error::NoQuestion)));
        assert_eq!(
            sent_titles(&drain(&mut outgoing)),
            ["something went wrong", "Session Stats"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pk_totals_bonuses() {
        let (channel, mut outgoing) = LocalChannel::new(ChannelId(1));
        let judge = ScriptedJudge::new([
            Ok(Verdict::Accept),
            Ok(Verdict::Accept),
            Ok(Verdict::Reject),
        ]);
        let source = ScriptedSource::bonuses([gas_bonus(), gas_bonus()]);
        let settings = Settings::default();
        let ctx = Context {
            channel: &channel,
            judge: &judge,
            settings: &settings,
            player: PLAYER,
        };
        post_at(&channel, 1_000, PLAYER, "boyle");
        post_at(&channel, 2_000, PLAYER, "charles");
        post_at(&channel, 3_000, PLAYER, "avogadro");
        post_at(&channel, 4_000, PLAYER, ">end");

        let stats = run_bonus_session(&ctx, &source, &Query::any(QuestionType::Bonus))
            .await
            .unwrap();

        assert_eq!(stats, BonusStats { points: 20, bonuses: 1 });
        let events = drain(&mut outgoing);
        assert!(sent_titles(&events).contains(&"20/30".to_string()));
        let summary = last_summary(&events);
        assert!(summary.fields.contains(&("PPB".into(), "20".into())));
    }
}
