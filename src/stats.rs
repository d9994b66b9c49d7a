//! Running session statistics
//!
//! Counters only ever grow. They are owned by the session loop, which
//! records each play's result after the play has returned; plays never
//! see them.

use enum_map::EnumMap;
use serde::Serialize;

use crate::{
    bonus::BonusResult,
    channel::Card,
    constants::scoring::RATE_BASIS,
    tossup::TossupOutcome,
};

/// Rounds to two decimals for display
fn round2(value: f64) -> f64 {
    (value * 100.).round() / 100.
}

fn plural(word: &str, count: u64) -> String {
    pluralizer::pluralize(word, isize::try_from(count).unwrap_or(isize::MAX), true)
}

/// Outcome counts of a `tk` session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TossupStats {
    counts: EnumMap<TossupOutcome, u64>,
}

impl TossupStats {
    /// Counts one scored tossup
    pub fn record(&mut self, outcome: TossupOutcome) {
        self.counts[outcome] += 1;
    }

    /// How often `outcome` happened
    pub fn count(&self, outcome: TossupOutcome) -> u64 {
        self.counts[outcome]
    }

    /// Tossups heard
    pub fn heard(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Points: 15 per power, 10 per correct, -5 per neg
    pub fn points(&self) -> i64 {
        self.counts
            .iter()
            .map(|(outcome, &count)| outcome.points() * i64::try_from(count).unwrap_or(i64::MAX))
            .sum()
    }

    /// Points per twenty tossups heard, or `None` before any tossup
    pub fn points_per_twenty(&self) -> Option<f64> {
        let heard = self.heard();
        (heard > 0).then(|| self.points() as f64 / heard as f64 * RATE_BASIS)
    }

    /// End-of-session card
    pub fn summary(&self) -> Card {
        use TossupOutcome::{Correct, Dead, Neg, Power};

        let rate = self
            .points_per_twenty()
            .map_or_else(|| "no tossups heard".to_owned(), |rate| round2(rate).to_string());
        Card::neutral("Session Stats")
            .with_description(format!("{} heard", plural("tossup", self.heard())))
            .with_field("Tossups", self.heard())
            .with_field(
                "Powers/10s/Negs",
                format!(
                    "{}/{}/{}",
                    self.count(Power),
                    self.count(Correct),
                    self.count(Neg)
                ),
            )
            .with_field("Dead Tossups", self.count(Dead))
            .with_field("Points", self.points())
            .with_field("PP20TUH", rate)
    }
}

/// Points of a `pk` session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BonusStats {
    /// Points earned
    pub points: u64,
    /// Bonuses heard to the end
    pub bonuses: u64,
}

impl BonusStats {
    /// Counts one finished bonus
    pub fn record(&mut self, result: &BonusResult) {
        self.points += result.points();
        self.bonuses += 1;
    }

    /// Points per bonus, or `None` before any bonus
    pub fn points_per_bonus(&self) -> Option<f64> {
        (self.bonuses > 0).then(|| self.points as f64 / self.bonuses as f64)
    }

    /// End-of-session card
    pub fn summary(&self) -> Card {
        let ppb = self
            .points_per_bonus()
            .map_or_else(|| "no bonuses heard".to_owned(), |ppb| round2(ppb).to_string());
        Card::neutral("Session Stats")
            .with_description(format!("{} heard", plural("bonus", self.bonuses)))
            .with_field("Bonuses", self.bonuses)
            .with_field("Points", self.points)
            .with_field("PPB", ppb)
    }
}
