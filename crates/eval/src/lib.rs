// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Evtracker Poker hand evaluator and equity estimator.
//!
//! Poker hand evaluator for 5, 6 and 7 cards hands, to use the evaluator create
//! a hand and use [HandValue] to evaluate the hand and get its rank:
//!
//! ```
//! # use evtracker_eval::*;
//! // 2c, 3c, .., Jc
//! let cards = Deck::default().into_iter().take(10).collect::<Vec<_>>();
//! let v1 = HandValue::eval(&cards[0..5]);
//! let v2 = HandValue::eval(&cards[5..]);
//! assert!(v2 > v1);
//! assert_eq!(v2.rank(), HandRank::StraightFlush);
//! ```
//!
//! The [equity] module builds on the evaluator to compute showdown equities
//! by enumerating or sampling the board runouts.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
pub mod equity;
pub mod eval;
pub mod rng;

pub use equity::{Equity, EquityError, Estimator};
pub use eval::{HandRank, HandValue};
pub use rng::Lcg;

// Reexport cards types.
pub use evtracker_cards::{Card, Deck, Rank, Suit, format_cards, parse_cards};
