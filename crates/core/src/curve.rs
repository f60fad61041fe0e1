// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Cumulative EV and bankroll curves.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    history::{Hand, HandId, Tournament},
    poker::Chips,
};

/// Players in a game, used to convert chips EV to a finish probability.
pub const DEFAULT_PLAYER_COUNT: u32 = 3;

/// Starting stack used when a tournament has no recorded stacks.
pub const DEFAULT_STARTING_STACK: Chips = Chips::new(500);

/// A point of the EV curve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvPoint {
    /// The hand, none for the starting point.
    pub hand_id: Option<HandId>,
    /// When the hand was played.
    pub played_at: Option<DateTime<Utc>>,
    /// Cumulative realized chips.
    pub cum_actual: i64,
    /// Cumulative all-in adjusted chips.
    pub cum_adj: i64,
}

/// A point of the bankroll curve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankrollPoint {
    /// The tournament game id.
    pub game_id: String,
    /// When the tournament started.
    pub started_at: Option<DateTime<Utc>>,
    /// Cumulative profit in cents.
    pub cum_profit_cents: i64,
    /// Cumulative expected profit in cents.
    pub cum_expected_cents: i64,
}

/// Builds the cumulative EV curve of the hands ordered by time.
///
/// Hands with no realized value count as zero and hands with no adjusted
/// value count with their realized value. The curve starts with a zero point.
pub fn ev_curve<'a, I>(hands: I) -> Vec<EvPoint>
where
    I: IntoIterator<Item = &'a Hand>,
{
    let mut hands = hands.into_iter().collect::<Vec<_>>();
    hands.sort_by_key(|h| h.played_at);

    let mut points = Vec::with_capacity(hands.len() + 1);
    points.push(EvPoint::default());

    let (mut actual, mut adjusted) = (0, 0);
    for hand in hands {
        let realized = hand.realized_change.unwrap_or_default();
        actual += realized;
        adjusted += hand.all_in_adjusted_change.unwrap_or(realized);

        points.push(EvPoint {
            hand_id: Some(hand.id),
            played_at: hand.played_at,
            cum_actual: actual,
            cum_adj: adjusted,
        });
    }

    points
}

/// Builds the cumulative bankroll curve of the tournaments ordered by time.
pub fn bankroll_curve(tournaments: &[Tournament], player_count: u32) -> Vec<BankrollPoint> {
    let mut tournaments = tournaments.iter().collect::<Vec<_>>();
    tournaments.sort_by_key(|t| t.started_at);

    let (mut profit, mut expected) = (0, 0);
    tournaments
        .into_iter()
        .map(|t| {
            profit += t.hero_profit.unwrap_or_default();
            expected += expected_profit(t, player_count);

            BankrollPoint {
                game_id: t.game_id.clone(),
                started_at: t.started_at,
                cum_profit_cents: profit,
                cum_expected_cents: expected,
            }
        })
        .collect()
}

/// The tournament expected profit in cents.
///
/// The hero chips EV in the tournament is converted to a share of the chips
/// in play that is used as the probability of winning the prize pool.
pub fn expected_profit(tournament: &Tournament, player_count: u32) -> i64 {
    let chip_ev = tournament
        .hands
        .iter()
        .map(|h| {
            h.all_in_adjusted_change
                .or(h.realized_change)
                .unwrap_or_default()
        })
        .sum::<i64>();

    let stack = tournament
        .starting_stack()
        .filter(|s| *s > Chips::ZERO)
        .unwrap_or(DEFAULT_STARTING_STACK)
        .signed() as f64;

    let total = player_count.max(1) as f64 * stack;
    let p = ((stack + chip_ev as f64) / total).clamp(0.0, 1.0);
    let prize_pool = tournament.prize_pool.unwrap_or_default() as f64;

    (p * prize_pool).round() as i64 - tournament.buy_in.unwrap_or_default()
}
