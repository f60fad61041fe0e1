// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Tournament and hand records reconstructed from a hand history.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

use crate::poker::{ActionKind, Chips, HoleCards, Street};

/// A stable hand identifier.
///
/// The id is derived from the tournament game id and the hand position in
/// the tournament so that parsing the same text always gives the same ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandId(u64);

impl HandId {
    /// Creates the id for the hand at `ordinal` in the tournament `game_id`.
    pub fn new(game_id: &str, ordinal: usize) -> Self {
        let key = format!("{game_id}#{ordinal}");
        Self(xxh3_64(key.as_bytes()))
    }

    /// The integer id value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for HandId {
    fn from(val: u64) -> Self {
        HandId(val)
    }
}

impl fmt::Display for HandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A player action in a hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Position in the hand actions, contiguous from 1.
    pub order: u32,
    /// The street the action was taken on.
    pub street: Street,
    /// The actor seat if it could be resolved.
    pub seat: Option<u8>,
    /// The action kind.
    pub kind: ActionKind,
    /// The action amount, a *to* amount for raises, none for check and fold.
    pub size: Option<Chips>,
    /// The player is all-in with this action.
    pub all_in: bool,
}

/// A player dealt in a hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandPlayer {
    /// The player seat, unique in a hand.
    pub seat: u8,
    /// The player name.
    pub name: String,
    /// The player stack at the start of the hand.
    pub stack: Chips,
    /// The player cards if shown.
    pub hole_cards: Option<HoleCards>,
    /// This is the tracked player.
    pub is_hero: bool,
}

/// A hand in a tournament.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    /// The hand id.
    pub id: HandId,
    /// The room hand number.
    pub hand_number: Option<String>,
    /// When the hand was played.
    pub played_at: Option<DateTime<Utc>>,
    /// The small blind size.
    pub small_blind: Option<Chips>,
    /// The big blind size.
    pub big_blind: Option<Chips>,
    /// The hero seat.
    pub hero_seat: Option<u8>,
    /// The main pot winner seat.
    pub winner_seat: Option<u8>,
    /// The hero dealt cards.
    pub hero_cards: Option<HoleCards>,
    /// The flop cards.
    pub board_flop: Option<String>,
    /// The board after the turn.
    pub board_turn: Option<String>,
    /// The board after the river.
    pub board_river: Option<String>,
    /// The last known board.
    pub board: Option<String>,
    /// The total pot.
    pub total_pot: Option<Chips>,
    /// The main pot.
    pub main_pot: Option<Chips>,
    /// Players dealt in the hand.
    pub players: Vec<HandPlayer>,
    /// Actions in order.
    pub actions: Vec<Action>,
    /// Hero chips change as it happened.
    pub realized_change: Option<i64>,
    /// Hero chips change with all-in equity.
    pub all_in_adjusted_change: Option<i64>,
}

impl Hand {
    /// Returns the player at the given seat.
    pub fn player(&self, seat: u8) -> Option<&HandPlayer> {
        self.players.iter().find(|p| p.seat == seat)
    }

    /// Returns the mutable player at the given seat.
    pub fn player_mut(&mut self, seat: u8) -> Option<&mut HandPlayer> {
        self.players.iter_mut().find(|p| p.seat == seat)
    }

    /// Checks if there is any data for this hand.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.actions.is_empty() && self.total_pot.is_none()
    }

    /// Hero stack at the start of the hand, or the first player stack.
    pub fn starting_stack(&self) -> Option<Chips> {
        self.hero_seat
            .and_then(|seat| self.player(seat))
            .or_else(|| self.players.first())
            .map(|p| p.stack)
    }
}

/// A tournament with its hands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    /// The room game id.
    pub game_id: String,
    /// Start time, the earliest seen.
    pub started_at: Option<DateTime<Utc>>,
    /// Buy-in in cents.
    pub buy_in: Option<i64>,
    /// Rake in cents.
    pub rake: Option<i64>,
    /// Prize pool in cents.
    pub prize_pool: Option<i64>,
    /// Prize pool multiplier.
    pub multiplier: Option<f64>,
    /// The hero name.
    pub hero_name: Option<String>,
    /// Hero finish position.
    pub hero_position: Option<u32>,
    /// Hero winnings in cents.
    pub hero_winnings: Option<i64>,
    /// Hero profit in cents, winnings minus buy-in and rake.
    pub hero_profit: Option<i64>,
    /// The tournament hands.
    pub hands: Vec<Hand>,
}

impl Tournament {
    /// Creates a tournament for the given game id.
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            ..Default::default()
        }
    }

    /// Merges a later parsed chunk of the same tournament.
    ///
    /// Non null fields of `other` replace this tournament fields, except the
    /// start time that takes the earliest, and the hands are appended.
    pub fn merge(&mut self, other: Tournament) {
        fn latest<T>(dst: &mut Option<T>, src: Option<T>) {
            if src.is_some() {
                *dst = src;
            }
        }

        self.started_at = match (self.started_at, other.started_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        latest(&mut self.buy_in, other.buy_in);
        latest(&mut self.rake, other.rake);
        latest(&mut self.prize_pool, other.prize_pool);
        latest(&mut self.multiplier, other.multiplier);
        latest(&mut self.hero_name, other.hero_name);
        latest(&mut self.hero_position, other.hero_position);
        latest(&mut self.hero_winnings, other.hero_winnings);
        latest(&mut self.hero_profit, other.hero_profit);

        self.hands.extend(other.hands);
    }

    /// Fills derived fields and assigns the hand ids.
    pub fn finalize(&mut self) {
        if self.prize_pool.is_none() {
            if let (Some(buy_in), Some(multiplier)) = (self.buy_in, self.multiplier) {
                self.prize_pool = Some((buy_in as f64 * multiplier).round() as i64);
            }
        }

        if let Some(winnings) = self.hero_winnings {
            self.hero_profit = Some(winnings - self.cost());
        }

        for (ordinal, hand) in self.hands.iter_mut().enumerate() {
            hand.id = HandId::new(&self.game_id, ordinal);
        }
    }

    /// Buy-in plus rake in cents.
    pub fn cost(&self) -> i64 {
        self.buy_in.unwrap_or_default() + self.rake.unwrap_or_default()
    }

    /// The hero stack in the first hand.
    pub fn starting_stack(&self) -> Option<Chips> {
        self.hands.first().and_then(Hand::starting_stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hand(seat: u8) -> Hand {
        Hand {
            hero_seat: Some(seat),
            ..Default::default()
        }
    }

    #[test]
    fn hand_ids_are_stable() {
        assert_eq!(HandId::new("g1", 0), HandId::new("g1", 0));
        assert_ne!(HandId::new("g1", 0), HandId::new("g1", 1));
        assert_ne!(HandId::new("g1", 0), HandId::new("g2", 0));
        assert_eq!(HandId::from(255).to_string(), "00000000000000ff");
    }

    #[test]
    fn merge_tournaments() {
        let early = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap();

        let mut t1 = Tournament::new("g1");
        t1.started_at = Some(late);
        t1.buy_in = Some(500);
        t1.rake = Some(50);
        t1.hands.push(hand(1));

        let mut t2 = Tournament::new("g1");
        t2.started_at = Some(early);
        t2.buy_in = Some(460);
        t2.hero_position = Some(1);
        t2.hands.push(hand(2));

        t1.merge(t2);
        assert_eq!(t1.started_at, Some(early));
        assert_eq!(t1.buy_in, Some(460));
        assert_eq!(t1.rake, Some(50));
        assert_eq!(t1.hero_position, Some(1));
        assert_eq!(t1.hands.len(), 2);
        assert_eq!(t1.hands[1].hero_seat, Some(2));
    }

    #[test]
    fn finalize_derived_fields() {
        let mut t = Tournament::new("g1");
        t.buy_in = Some(460);
        t.rake = Some(40);
        t.multiplier = Some(2.0);
        t.hero_winnings = Some(2000);
        t.hands = vec![hand(1), hand(2)];
        t.finalize();

        assert_eq!(t.prize_pool, Some(920));
        assert_eq!(t.hero_profit, Some(1500));
        assert_eq!(t.hands[0].id, HandId::new("g1", 0));
        assert_eq!(t.hands[1].id, HandId::new("g1", 1));

        // An explicit prize pool is kept.
        let mut t = Tournament::new("g2");
        t.buy_in = Some(100);
        t.multiplier = Some(10.0);
        t.prize_pool = Some(500);
        t.finalize();
        assert_eq!(t.prize_pool, Some(500));
        assert_eq!(t.hero_profit, None);
    }

    #[test]
    fn starting_stack() {
        let mut h = hand(2);
        assert_eq!(h.starting_stack(), None);

        for (seat, stack) in [(1, 400), (2, 600)] {
            h.players.push(HandPlayer {
                seat,
                name: format!("p{seat}"),
                stack: Chips::new(stack),
                hole_cards: None,
                is_hero: seat == 2,
            });
        }

        assert_eq!(h.starting_stack(), Some(Chips::new(600)));
        h.hero_seat = None;
        assert_eq!(h.starting_stack(), Some(Chips::new(400)));
    }
}
