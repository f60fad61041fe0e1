// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Showdown equity estimation.
//!
//! Given the hero hole cards, one or more villains hole cards and a partial
//! board the estimator computes how often the hero wins or ties once the board
//! is complete. With 1 or 2 cards to come all the runouts are enumerated,
//! with 3 or more cards to come runouts are sampled.
//!
//! ```
//! # use evtracker_eval::{equity::*, parse_cards};
//! let hero = parse_cards("As Kd");
//! let villain = parse_cards("Qh Qd");
//! let board = parse_cards("2h 7s Jd");
//!
//! let eq = Estimator::new(&[hero[0], hero[1]], &[[villain[0], villain[1]]], &board)
//!     .seeded(0, 7)
//!     .unwrap();
//!
//! // Flop to river is enumerated so the result is exact.
//! assert_eq!(eq.samples, 990);
//! assert!(eq.win > 0.0 && eq.win + eq.tie <= 1.0);
//! ```
use ahash::AHashSet;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Card, Deck, HandValue, rng::Lcg};

/// Hero showdown equity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Equity {
    /// The fraction of runouts the hero wins alone.
    pub win: f64,
    /// The fraction of runouts the hero ties with one or more villains.
    pub tie: f64,
    /// Number of evaluated runouts.
    pub samples: usize,
}

impl Equity {
    /// The fraction of runouts the hero loses.
    pub fn lose(&self) -> f64 {
        (1.0 - self.win - self.tie).max(0.0)
    }
}

/// Equity estimation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquityError {
    /// There are no villains hands to compare against.
    #[error("no villain hands")]
    NoVillains,
    /// The board has more than 5 cards.
    #[error("board has {0} cards")]
    TooManyBoardCards(usize),
    /// The same card appears twice in the input.
    #[error("duplicate card {0}")]
    DuplicateCard(Card),
}

/// Showdown outcome for the hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Hero has the best hand alone.
    Win,
    /// Hero shares the best hand.
    Tie,
    /// A villain has a better hand.
    Lose,
}

/// Equity estimator for a hero against one or more villains.
#[derive(Debug, Clone)]
pub struct Estimator<'a> {
    hero: &'a [Card; 2],
    villains: &'a [[Card; 2]],
    board: &'a [Card],
}

#[derive(Debug, Default)]
struct Counts {
    win: usize,
    tie: usize,
    total: usize,
}

impl Counts {
    fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.win += 1,
            Outcome::Tie => self.tie += 1,
            Outcome::Lose => {}
        }

        self.total += 1;
    }

    fn equity(&self) -> Equity {
        if self.total == 0 {
            return Equity::default();
        }

        let total = self.total as f64;
        Equity {
            win: self.win as f64 / total,
            tie: self.tie as f64 / total,
            samples: self.total,
        }
    }
}

impl<'a> Estimator<'a> {
    /// Creates an estimator for the given hands and known board cards.
    pub fn new(hero: &'a [Card; 2], villains: &'a [[Card; 2]], board: &'a [Card]) -> Self {
        Self {
            hero,
            villains,
            board,
        }
    }

    /// Number of board cards still to come.
    pub fn cards_to_come(&self) -> usize {
        5usize.saturating_sub(self.board.len())
    }

    /// Estimates equity drawing random runouts from an unseeded source.
    pub fn estimate(&self, samples: usize) -> Result<Equity, EquityError> {
        self.estimate_with(samples, &mut SmallRng::from_os_rng())
    }

    /// Estimates equity drawing random runouts from a seeded [Lcg], same seed
    /// and samples give the same result.
    pub fn seeded(&self, samples: usize, seed: u64) -> Result<Equity, EquityError> {
        self.estimate_with(samples, &mut Lcg::new(seed))
    }

    /// Estimates equity drawing random runouts from the given generator.
    ///
    /// The generator is used only with 3 or more cards to come, otherwise the
    /// runouts are enumerated and `samples` is ignored.
    pub fn estimate_with<R>(&self, samples: usize, rng: &mut R) -> Result<Equity, EquityError>
    where
        R: Rng + ?Sized,
    {
        let mut deck = self.validate()?;

        let counts = match self.cards_to_come() {
            0 => {
                let mut counts = Counts::default();
                counts.add(self.showdown(&[]));
                counts
            }
            need @ (1 | 2) => self.enumerate(&deck, need),
            need => self.monte_carlo(&mut deck, need, samples, rng),
        };

        Ok(counts.equity())
    }

    /// Returns the deck of unseen cards.
    fn validate(&self) -> Result<Deck, EquityError> {
        if self.villains.is_empty() {
            return Err(EquityError::NoVillains);
        }

        if self.board.len() > 5 {
            return Err(EquityError::TooManyBoardCards(self.board.len()));
        }

        let mut used = AHashSet::with_capacity(9 + 2 * self.villains.len());
        let cards = self
            .hero
            .iter()
            .chain(self.villains.iter().flatten())
            .chain(self.board);
        for &card in cards {
            if !used.insert(card) {
                return Err(EquityError::DuplicateCard(card));
            }
        }

        Ok(Deck::without(&used.into_iter().collect::<Vec<_>>()))
    }

    fn enumerate(&self, deck: &Deck, need: usize) -> Counts {
        let mut counts = Counts::default();
        deck.for_each(need, |runout| counts.add(self.showdown(runout)));
        counts
    }

    fn monte_carlo<R>(&self, deck: &mut Deck, need: usize, samples: usize, rng: &mut R) -> Counts
    where
        R: Rng + ?Sized,
    {
        let mut counts = Counts::default();
        deck.sample(rng, samples, need, |runout| counts.add(self.showdown(runout)));
        counts
    }

    /// Compares hands on the board completed with the runout cards.
    fn showdown(&self, runout: &[Card]) -> Outcome {
        let mut cards = [self.hero[0]; 7];
        cards[1] = self.hero[1];
        for (dst, &src) in cards[2..].iter_mut().zip(self.board.iter().chain(runout)) {
            *dst = src;
        }

        let hero = HandValue::eval(&cards);
        let best_villain = self
            .villains
            .iter()
            .map(|v| {
                cards[0] = v[0];
                cards[1] = v[1];
                HandValue::eval(&cards)
            })
            .max();

        match best_villain {
            Some(v) if v > hero => Outcome::Lose,
            Some(v) if v == hero => Outcome::Tie,
            _ => Outcome::Win,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_cards;

    fn hand(s: &str) -> [Card; 2] {
        let cards = parse_cards(s);
        [cards[0], cards[1]]
    }

    #[test]
    fn complete_board() {
        let board = parse_cards("2h 7s Jd 4c 9c");

        let (hero, villains) = (hand("Js Jc"), [hand("Qh Qd")]);
        let eq = Estimator::new(&hero, &villains, &board).estimate(0).unwrap();
        assert_eq!((eq.win, eq.tie, eq.samples), (1.0, 0.0, 1));

        // Both play ace high with the same board kickers.
        let (hero, villains) = (hand("Ac 3d"), [hand("Ah 3s")]);
        let eq = Estimator::new(&hero, &villains, &board).estimate(0).unwrap();
        assert_eq!((eq.win, eq.tie), (0.0, 1.0));

        let (hero, villains) = (hand("Ac 3d"), [hand("Kh Ks")]);
        let eq = Estimator::new(&hero, &villains, &board).estimate(0).unwrap();
        assert_eq!((eq.win, eq.tie, eq.lose()), (0.0, 0.0, 1.0));
    }

    #[test]
    fn multiway_tie_counts_as_tie() {
        // Broadway on board, everybody ties.
        let board = parse_cards("Th Js Qd Kc Ac");
        let hero = hand("2c 3d");
        let villains = [hand("4h 5s"), hand("6d 7h")];
        let eq = Estimator::new(&hero, &villains, &board).estimate(0).unwrap();
        assert_eq!((eq.win, eq.tie), (0.0, 1.0));
    }

    #[test]
    fn exhaustive_turn_and_flop() {
        let (hero, villains) = (hand("As Kd"), [hand("Qh Qd")]);

        let board = parse_cards("2h 7s Jd 4c");
        let eq = Estimator::new(&hero, &villains, &board).estimate(0).unwrap();
        assert_eq!(eq.samples, 44);
        // Six outs to an ace or a king.
        assert_eq!(eq.win, 6.0 / 44.0);

        let board = parse_cards("2h 7s Jd");
        let eq = Estimator::new(&hero, &villains, &board).estimate(0).unwrap();
        assert_eq!(eq.samples, 45 * 44 / 2);
        assert!(eq.win > 0.0 && eq.win + eq.tie <= 1.0);
    }

    #[test]
    fn exhaustive_matches_monte_carlo() {
        let hero = hand("As Kd");
        let villains = [hand("Qh Qd"), hand("9c 8c")];
        let board = parse_cards("2h 7s Jd");
        let est = Estimator::new(&hero, &villains, &board);

        let exact = est.estimate(0).unwrap();

        let mut deck = est.validate().unwrap();
        let sampled = est
            .monte_carlo(&mut deck, 2, 100_000, &mut Lcg::new(11))
            .equity();

        assert_eq!(sampled.samples, 100_000);
        assert!((exact.win - sampled.win).abs() < 0.01);
        assert!((exact.tie - sampled.tie).abs() < 0.01);
    }

    #[test]
    fn preflop_coin_flip() {
        let (hero, villains) = (hand("As Kd"), [hand("Qh Qd")]);
        let eq = Estimator::new(&hero, &villains, &[])
            .seeded(20_000, 1)
            .unwrap();

        assert_eq!(eq.samples, 20_000);
        assert!(eq.win > 0.38 && eq.win < 0.50, "win {}", eq.win);
        assert!(eq.win + eq.tie <= 1.0);
    }

    #[test]
    fn seeded_is_reproducible() {
        let (hero, villains) = (hand("Ah Ad"), [hand("Kc Ks"), hand("7h 8h")]);
        let est = Estimator::new(&hero, &villains, &[]);

        let e1 = est.seeded(5_000, 99).unwrap();
        let e2 = est.seeded(5_000, 99).unwrap();
        assert_eq!(e1, e2);
        assert!(e1.win > 0.5);
    }

    #[test]
    fn invalid_inputs() {
        let hero = hand("As Kd");

        let err = Estimator::new(&hero, &[], &[]).estimate(10);
        assert_eq!(err, Err(EquityError::NoVillains));

        let villains = [hand("As Qd")];
        let err = Estimator::new(&hero, &villains, &[]).estimate(10);
        assert!(matches!(err, Err(EquityError::DuplicateCard(_))));

        let villains = [hand("Qh Qd")];
        let board = parse_cards("2h 3h 4h 5h 6h 7h");
        let err = Estimator::new(&hero, &villains, &board).estimate(10);
        assert_eq!(err, Err(EquityError::TooManyBoardCards(6)));
    }
}
