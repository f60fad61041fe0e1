// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Hero chips EV for a hand.
//!
//! Two values are computed for each hand: the *realized* change is the chips
//! the hero won or lost as dealt, the *all-in adjusted* change replaces the
//! runout after the hero first all-in with the hero equity at that moment.
//!
//! Both values only count the pot the hero can win, opponents contributions
//! are capped at the hero contribution.
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use evtracker_eval::{Estimator, HandValue};

use crate::{
    history::{Action, Hand, HandId},
    poker::{ActionKind, Card, Chips, HoleCards, Street, parse_cards},
    store::HandRepository,
};

/// EV errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvError {
    /// There is no hand with this id.
    #[error("hand {0} not found")]
    HandNotFound(HandId),
}

/// A player in an [EvHand].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvPlayer {
    /// The player seat.
    pub seat: u8,
    /// The player cards if shown.
    pub hole_cards: Option<HoleCards>,
}

/// The hand data needed to compute EV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvHand {
    /// The hand id.
    pub id: HandId,
    /// The hero seat.
    pub hero_seat: Option<u8>,
    /// The hero cards.
    pub hero_cards: Option<HoleCards>,
    /// The main pot winner.
    pub winner_seat: Option<u8>,
    /// The flop cards.
    pub board_flop: Option<String>,
    /// The board after the turn.
    pub board_turn: Option<String>,
    /// The board after the river.
    pub board_river: Option<String>,
    /// The last known board.
    pub board: Option<String>,
    /// The hand players.
    pub players: Vec<EvPlayer>,
    /// The hand actions.
    pub actions: Vec<Action>,
}

impl From<&Hand> for EvHand {
    fn from(hand: &Hand) -> Self {
        let mut actions = hand.actions.clone();
        actions.sort_by_key(|a| a.order);

        Self {
            id: hand.id,
            hero_seat: hand.hero_seat,
            hero_cards: hand.hero_cards,
            winner_seat: hand.winner_seat,
            board_flop: hand.board_flop.clone(),
            board_turn: hand.board_turn.clone(),
            board_river: hand.board_river.clone(),
            board: hand.board.clone(),
            players: hand
                .players
                .iter()
                .map(|p| EvPlayer {
                    seat: p.seat,
                    hole_cards: p.hole_cards,
                })
                .collect(),
            actions,
        }
    }
}

impl EvHand {
    /// Returns the board as known on a street.
    ///
    /// Uses the street board or the combined board if it has enough cards,
    /// else the board field with the most cards.
    pub fn board_on(&self, street: Street) -> Vec<Card> {
        let need = street.board_len();
        if need == 0 {
            return Vec::new();
        }

        let street_board = match street {
            Street::Flop => &self.board_flop,
            Street::Turn => &self.board_turn,
            _ => &self.board_river,
        };

        let fields = [street_board, &self.board]
            .into_iter()
            .flatten()
            .map(|s| parse_cards(s));
        for mut cards in fields {
            if cards.len() >= need {
                cards.truncate(need);
                return cards;
            }
        }

        [
            &self.board,
            &self.board_river,
            &self.board_turn,
            &self.board_flop,
        ]
        .into_iter()
        .flatten()
        .map(|s| parse_cards(s))
        .max_by_key(Vec::len)
        .unwrap_or_default()
    }

    fn player_cards(&self, seat: u8) -> Option<HoleCards> {
        self.players
            .iter()
            .find(|p| p.seat == seat)
            .and_then(|p| p.hole_cards)
    }
}

/// Chips put in the pot by each seat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contributions {
    totals: BTreeMap<u8, Chips>,
    folded: BTreeSet<u8>,
}

impl Contributions {
    /// Replays the actions in order.
    ///
    /// Calls and bets add their size, raises and pushes are *to* amounts on
    /// the street so they only add the difference with what the seat already
    /// invested on that street.
    pub fn replay(actions: &[Action]) -> Self {
        let mut contributions = Self::default();
        let mut street = None;
        let mut invested = BTreeMap::<u8, Chips>::new();

        for action in actions {
            if street != Some(action.street) {
                street = Some(action.street);
                invested.clear();
            }

            let Some(seat) = action.seat else {
                continue;
            };

            let size = action.size.unwrap_or_default();
            let street_total = invested.entry(seat).or_default();
            let added = match action.kind {
                ActionKind::Fold => {
                    contributions.folded.insert(seat);
                    Chips::ZERO
                }
                ActionKind::Check => Chips::ZERO,
                ActionKind::Call | ActionKind::Bet => {
                    *street_total += size;
                    size
                }
                ActionKind::Raise | ActionKind::Push => {
                    let prev = *street_total;
                    *street_total = prev.max(size);
                    *street_total - prev
                }
            };

            *contributions.totals.entry(seat).or_default() += added;
        }

        contributions
    }

    /// The seat total contribution.
    pub fn total(&self, seat: u8) -> Chips {
        self.totals.get(&seat).copied().unwrap_or_default()
    }

    /// Checks if the seat folded.
    pub fn folded(&self, seat: u8) -> bool {
        self.folded.contains(&seat)
    }

    /// Seats other than `hero` that never folded and put chips in the pot.
    pub fn live_opponents(&self, hero: u8) -> impl Iterator<Item = u8> + '_ {
        self.totals
            .iter()
            .filter(move |&(&seat, &total)| {
                seat != hero && total > Chips::ZERO && !self.folded(seat)
            })
            .map(|(&seat, _)| seat)
    }

    /// The pot `hero` can win: its contribution plus every other seat
    /// contribution capped at the hero one.
    pub fn eligible_pot(&self, hero: u8) -> Chips {
        let hero_total = self.total(hero);
        let others = self
            .totals
            .iter()
            .filter(|&(&seat, _)| seat != hero)
            .map(|(_, &total)| total.min(hero_total))
            .sum::<Chips>();

        hero_total + others
    }
}

/// The EV of a hand for the hero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvResult {
    /// Chips change as dealt.
    pub realized: Option<i64>,
    /// Chips change using the all-in equity.
    pub adjusted: Option<i64>,
    /// Number of runouts evaluated for the adjusted value.
    pub samples: usize,
}

/// Computes hands EV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvCalculator {
    samples: usize,
    seed: Option<u64>,
}

impl Default for EvCalculator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SAMPLES)
    }
}

impl EvCalculator {
    /// Default number of Monte Carlo samples.
    pub const DEFAULT_SAMPLES: usize = 20_000;

    /// Creates a calculator with an unseeded random source.
    pub fn new(samples: usize) -> Self {
        Self {
            samples,
            seed: None,
        }
    }

    /// Creates a calculator that gives the same results for the same hands.
    pub fn with_seed(samples: usize, seed: u64) -> Self {
        Self {
            samples,
            seed: Some(seed),
        }
    }

    /// Number of Monte Carlo samples.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// The random seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Computes the hand realized and adjusted EV.
    pub fn compute(&self, hand: &EvHand) -> EvResult {
        let Some(hero) = hand.hero_seat else {
            return EvResult::default();
        };

        let contributions = Contributions::replay(&hand.actions);
        let (adjusted, samples) = match self.adjusted(hand, hero, &contributions) {
            Some((adjusted, samples)) => (Some(adjusted), samples),
            None => (None, 0),
        };

        EvResult {
            realized: realized(hand, hero, &contributions),
            adjusted,
            samples,
        }
    }

    fn adjusted(&self, hand: &EvHand, hero: u8, c: &Contributions) -> Option<(i64, usize)> {
        let all_in = hand
            .actions
            .iter()
            .find(|a| a.seat == Some(hero) && a.all_in)?;

        let eligible = c.eligible_pot(hero).signed();
        if eligible == 0 {
            return None;
        }

        let contribution = c.total(hero).signed();
        let villains = c
            .live_opponents(hero)
            .map(|seat| hand.player_cards(seat).map(|cards| cards.to_array()))
            .collect::<Option<Vec<_>>>()?;

        if villains.is_empty() {
            return Some((eligible - contribution, 0));
        }

        let hero_cards = hand.hero_cards?.to_array();
        let board = hand.board_on(all_in.street);
        let estimator = Estimator::new(&hero_cards, &villains, &board);
        let equity = match self.seed {
            Some(seed) => estimator.seeded(self.samples, seed),
            None => estimator.estimate(self.samples),
        };

        let equity = match equity {
            Ok(equity) => equity,
            Err(e) => {
                warn!("Hand {} equity error: {e}", hand.id);
                return None;
            }
        };

        // No runouts evaluated, nothing to estimate from.
        if equity.samples == 0 {
            return None;
        }

        let share = if villains.len() == 1 {
            equity.win + 0.5 * equity.tie
        } else {
            equity.win
        };

        let adjusted = (share * eligible as f64 - contribution as f64).round() as i64;
        Some((adjusted, equity.samples))
    }
}

fn realized(hand: &EvHand, hero: u8, c: &Contributions) -> Option<i64> {
    let contribution = c.total(hero).signed();
    if c.folded(hero) {
        return Some(-contribution);
    }

    let eligible = c.eligible_pot(hero).signed();
    if eligible == 0 {
        return None;
    }

    let villains = hand
        .players
        .iter()
        .filter(|p| p.seat != hero && !c.folded(p.seat) && c.total(p.seat) > Chips::ZERO)
        .filter_map(|p| p.hole_cards)
        .collect::<Vec<_>>();

    if villains.is_empty() {
        return match hand.winner_seat {
            Some(winner) if winner != hero => Some(-contribution),
            _ => Some(eligible - contribution),
        };
    }

    let hero_cards = hand.hero_cards?;
    let board = hand.board_on(Street::River);
    if board.len() < 5 {
        return None;
    }

    let value = |cards: HoleCards| {
        let mut all = board.clone();
        all.extend(cards.to_array());
        HandValue::eval(&all)
    };

    let hero_value = value(hero_cards);
    let mut tied = 1;
    for villain in villains.into_iter().map(value) {
        if villain > hero_value {
            return Some(-contribution);
        } else if villain == hero_value {
            tied += 1;
        }
    }

    Some(eligible / tied - contribution)
}

/// Computes the EV of a stored hand and saves it.
///
/// Computing again overwrites the stored values.
pub fn compute_hand_ev<R>(
    repo: &mut R,
    id: HandId,
    calculator: &EvCalculator,
) -> Result<EvResult, EvError>
where
    R: HandRepository + ?Sized,
{
    let hand = repo.hand(id).ok_or(EvError::HandNotFound(id))?;
    let result = calculator.compute(&EvHand::from(&hand));

    if !repo.set_ev(id, result.realized, result.adjusted) {
        return Err(EvError::HandNotFound(id));
    }

    Ok(result)
}
