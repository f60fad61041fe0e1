// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Evtracker cards types.
//!
//! This crate define types to create cards:
//!
//! ```
//! # use evtracker_cards::{Card, Rank, Suit};
//! let ah = Card::new(Rank::Ace, Suit::Hearts);
//! let kd: Card = "kD".parse().unwrap();
//! assert_eq!(kd, Card::new(Rank::King, Suit::Diamonds));
//! assert_eq!(kd.to_string(), "Kd");
//! ```
//!
//! and a [Deck] type for enumerating and sampling the cards left in the deck
//! once the known cards have been removed.
//!
//! For example to iterate through all the 2-cards runouts left after a flop:
//!
//! ```
//! # use evtracker_cards::{parse_cards, Deck};
//! let known = parse_cards("As Kd Qh Qd 2h 7s Jd");
//! let deck = Deck::without(&known);
//! let mut counter = 0;
//! deck.for_each(2, |runout| {
//!     assert_eq!(runout.len(), 2);
//!     counter += 1;
//! });
//! assert_eq!(counter, 990);
//! ```
//!
//! to sample 10 random 5-cards boards with a partial shuffle of the deck:
//!
//! ```
//! # use evtracker_cards::Deck;
//! let mut counter = 0;
//! Deck::default().sample(&mut rand::rng(), 10, 5, |board| {
//!     assert_eq!(board.len(), 5);
//!     counter += 1;
//! });
//! assert_eq!(counter, 10);
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
mod deck;
pub use deck::{Card, CardParseError, Deck, Rank, Suit, format_cards, parse_cards};
